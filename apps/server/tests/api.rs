//! End-to-end tests driving the router against in-memory SQLite.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use spares_db::{Database, DbConfig};
use spares_server::auth::hash_password;
use spares_server::{build_router, AppState, ServerConfig};
use tower::ServiceExt;

const SHOP: &str = "shop@example.com";
const OTHER_SHOP: &str = "other@example.com";
const ADMIN: &str = "admin@example.com";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    db: Database,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        let router = build_router(AppState::new(db.clone(), config));
        TestApp { db, router }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    async fn register(&self, email: &str) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/register",
                &[],
                Some(json!({
                    "name": "Asha Patil",
                    "shop_name": "Patil Motors",
                    "email": email,
                    "password": "secret123",
                    "shop_location": "Pune",
                    "phone": "9876543210",
                    "gst_number": "27ABCDE1234F1Z5"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    /// Adds a part for `owner` and returns its id.
    async fn add_part(&self, owner: &str, price: i64, quantity: i64, gst_rate: i64) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/add-part",
                &[("x-user-email", owner)],
                Some(json!({
                    "part_number": "BRK-100",
                    "name": "Brake Pad",
                    "description": "Front brake pad set",
                    "price": price,
                    "original_price": price + 20,
                    "quantity_owned": quantity,
                    "gst_rate": gst_rate,
                    "hsn_code": "8708"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["part"]["id"].as_str().unwrap().to_string()
    }

    async fn quantity_of(&self, id: &str) -> i64 {
        self.db
            .parts()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .quantity_owned
    }
}

// =============================================================================
// Health & Accounts
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/", &[], None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;
    app.register(SHOP).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/register",
            &[],
            Some(json!({
                "name": "Someone Else",
                "shop_name": "Copy Shop",
                "email": SHOP,
                "password": "secret123",
                "shop_location": "Pune",
                "phone": "9876543210"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/login",
            &[],
            Some(json!({ "email": SHOP, "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["gst_status"], "Registered");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/login",
            &[],
            Some(json!({ "email": SHOP, "password": "wrong-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect password");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/login",
            &[],
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Email not found");
}

#[tokio::test]
async fn test_register_rejects_bad_phone() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/register",
            &[],
            Some(json!({
                "name": "Asha Patil",
                "shop_name": "Patil Motors",
                "email": SHOP,
                "password": "secret123",
                "shop_location": "Pune",
                "phone": "12345"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_email_change_moves_parts() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let id = app.add_part(SHOP, 100, 5, 18).await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/update-profile",
            &[("x-user-email", SHOP)],
            Some(json!({
                "name": "Asha Patil",
                "shop_name": "Patil Motors",
                "email": "new@example.com",
                "shop_location": "Pune",
                "phone": "9876543210"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let part = app.db.parts().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(part.owner_email, "new@example.com");
}

// =============================================================================
// Parts
// =============================================================================

#[tokio::test]
async fn test_sell_part_rules() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    app.register(OTHER_SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 18).await;
    let uri = format!("/api/sell-part/{}", id);

    let (status, _) = app
        .send(Method::PUT, &uri, &[], Some(json!({ "sellQuantity": 1 })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            &[("x-user-email", SHOP)],
            Some(json!({ "sellQuantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            &[("x-user-email", OTHER_SHOP)],
            Some(json!({ "sellQuantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            &[("x-user-email", SHOP)],
            Some(json!({ "sellQuantity": 15 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(app.quantity_of(&id).await, 10);

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            &[("x-user-email", SHOP)],
            Some(json!({ "sellQuantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity_owned"], 7);
    assert_eq!(body["part_name"], "Brake Pad");

    // sell-part moves stock only
    assert_eq!(app.db.sales().count_by_shop(SHOP).await.unwrap(), 0);
}

#[tokio::test]
async fn test_only_owner_may_edit() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    app.register(OTHER_SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 18).await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/delete-part/{}", id),
            &[("x-user-email", OTHER_SHOP)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/delete-part/{}", id),
            &[("x-user-email", SHOP)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.db.parts().get_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_gst_rate_becomes_eighteen() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 7).await;

    let part = app.db.parts().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(part.gst_rate.percent(), 18);

    let (status, body) = app
        .send(Method::GET, "/api/gst-summary", &[("x-user-email", SHOP)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["gst_rate"], 18);
    assert_eq!(body[0]["total_inventory_value"], 1000.0);
}

// =============================================================================
// Checkout & Invoices
// =============================================================================

#[tokio::test]
async fn test_checkout_completed() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 18).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({
                "customer_name": "Vikram",
                "invoice_number": "INV-TEST-1",
                "lines": [{ "part_id": id, "quantity": 3 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["invoice"]["grand_total"], 354.0);
    assert_eq!(body["invoice"]["total_cgst"], 27.0);
    assert_eq!(
        body["invoice"]["amount_in_words"],
        "Three Hundred Fifty Four Rupees Only"
    );
    assert_eq!(app.quantity_of(&id).await, 7);

    let (status, history) = app
        .send(Method::GET, "/api/sales-history", &[("x-user-email", SHOP)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["total_amount"], 354.0);
    assert_eq!(history[0]["invoice_number"], "INV-TEST-1");

    let (status, text) = app
        .send(
            Method::GET,
            "/api/invoices/INV-TEST-1/text",
            &[("x-user-email", SHOP)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let text = text.as_str().unwrap();
    assert!(text.contains("INV-TEST-1"));
    assert!(text.contains("Three Hundred Fifty Four Rupees Only"));
}

#[tokio::test]
async fn test_checkout_partial_and_rejected() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 18).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({
                "customer_name": "Vikram",
                "lines": [
                    { "part_id": id, "quantity": 2 },
                    { "part_id": id, "quantity": 50 }
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::MULTI_STATUS, "{body}");
    assert_eq!(body["failure_kind"], "PARTIAL_INVOICE");
    assert_eq!(body["outcome"]["lines"][0]["status"], "committed");
    assert_eq!(body["outcome"]["lines"][1]["status"], "rejected");
    assert_eq!(
        body["outcome"]["lines"][1]["reason"]["code"],
        "INSUFFICIENT_STOCK"
    );
    assert!(body["outcome"]["invoice_number"]
        .as_str()
        .unwrap()
        .starts_with("INV-"));
    assert_eq!(app.quantity_of(&id).await, 8);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({
                "customer_name": "Vikram",
                "lines": [{ "part_id": "missing", "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["invoice"].is_null());
}

#[tokio::test]
async fn test_checkout_with_ledger_down_is_retryable() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let id = app.add_part(SHOP, 100, 10, 18).await;

    sqlx::query("DROP TABLE sales_history")
        .execute(app.db.pool())
        .await
        .unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({
                "customer_name": "Vikram",
                "lines": [{ "part_id": id, "quantity": 3 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{body}");
    assert_eq!(body["failure_kind"], "PERSISTENCE");
    let reason = &body["outcome"]["lines"][0]["reason"];
    assert_eq!(reason["code"], "PERSISTENCE_FAILURE");
    assert_eq!(reason["stock_decremented"], true);
    assert_eq!(app.quantity_of(&id).await, 7);
}

#[tokio::test]
async fn test_add_part_rejects_out_of_range_price() {
    let app = TestApp::new().await;
    app.register(SHOP).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/add-part",
            &[("x-user-email", SHOP)],
            Some(json!({
                "part_number": "BRK-100",
                "name": "Brake Pad",
                "description": "Front brake pad set",
                "price": 1e27,
                "original_price": 1e27,
                "quantity_owned": 100,
                "gst_rate": 18
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send(Method::GET, "/api/my-parts", &[("x-user-email", SHOP)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_shop_header_is_unauthorized() {
    let app = TestApp::new().await;
    app.register(SHOP).await;

    let (status, _) = app
        .send(Method::GET, "/api/my-parts", &[("x-user-email", "not-an-email")], None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/api/my-parts", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/my-parts", &[("x-user-email", SHOP)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_validation() {
    let app = TestApp::new().await;
    app.register(SHOP).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({ "customer_name": "", "lines": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", "ghost@example.com")],
            Some(json!({
                "customer_name": "Vikram",
                "lines": [{ "part_id": "x", "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_access() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let hash = hash_password("admin123").unwrap();
    app.db.admins().upsert(ADMIN, &hash).await.unwrap();

    let (status, _) = app.send(Method::GET, "/api/admin/users", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/admin/users", &[("x-admin-email", SHOP)], None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::GET, "/api/admin/users", &[("x-admin-email", ADMIN)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/login",
            &[],
            Some(json!({ "email": ADMIN, "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_delete_keeps_sales_history() {
    let app = TestApp::new().await;
    app.register(SHOP).await;
    let hash = hash_password("admin123").unwrap();
    app.db.admins().upsert(ADMIN, &hash).await.unwrap();

    let id = app.add_part(SHOP, 100, 10, 18).await;
    app.add_part(SHOP, 50, 4, 5).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/checkout",
            &[("x-user-email", SHOP)],
            Some(json!({
                "customer_name": "Vikram",
                "lines": [{ "part_id": id, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stats) = app
        .send(
            Method::GET,
            "/api/admin/dashboard-stats",
            &[("x-admin-email", ADMIN)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_users"], 1);
    assert_eq!(stats["total_parts"], 2);
    assert_eq!(stats["total_inventory_value"], 1100.0);

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/users/{}", SHOP),
            &[("x-admin-email", ADMIN)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parts_removed"], 2);

    assert_eq!(app.db.parts().count().await.unwrap(), 0);
    assert_eq!(app.db.sales().count_by_shop(SHOP).await.unwrap(), 1);
}
