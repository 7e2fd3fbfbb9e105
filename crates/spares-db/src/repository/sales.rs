//! # Sales Repository
//!
//! The sales ledger: one row per committed sale line, written once and
//! never changed. Triggers in the schema refuse UPDATE and DELETE, so the
//! only write path is [`SalesRepository::append`].

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, gst_column, money_column};
use spares_core::{NewSaleRecord, SalesHistoryRecord};

const SALE_COLUMNS: &str = "id, part_id, part_number, part_name, customer_name, \
     quantity_sold, selling_price, total_amount, gst_rate, sgst_amount, cgst_amount, \
     shop_email, invoice_number, sale_date";

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    part_id: String,
    part_number: String,
    part_name: String,
    customer_name: String,
    quantity_sold: i64,
    selling_price: String,
    total_amount: String,
    gst_rate: i64,
    sgst_amount: String,
    cgst_amount: String,
    shop_email: String,
    invoice_number: String,
    sale_date: DateTime<Utc>,
}

impl TryFrom<SaleRow> for SalesHistoryRecord {
    type Error = DbError;

    fn try_from(row: SaleRow) -> DbResult<SalesHistoryRecord> {
        Ok(SalesHistoryRecord {
            selling_price: money_column("selling_price", &row.selling_price)?,
            total_amount: money_column("total_amount", &row.total_amount)?,
            sgst_amount: money_column("sgst_amount", &row.sgst_amount)?,
            cgst_amount: money_column("cgst_amount", &row.cgst_amount)?,
            gst_rate: gst_column(row.gst_rate)?,
            id: row.id,
            part_id: row.part_id,
            part_number: row.part_number,
            part_name: row.part_name,
            customer_name: row.customer_name,
            quantity_sold: row.quantity_sold,
            shop_email: row.shop_email,
            invoice_number: row.invoice_number,
            sale_date: row.sale_date,
        })
    }
}

fn into_records(rows: Vec<SaleRow>) -> DbResult<Vec<SalesHistoryRecord>> {
    rows.into_iter().map(SalesHistoryRecord::try_from).collect()
}

/// Repository for the append-only sales ledger.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    /// Creates a new SalesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    /// Appends one record and returns its generated id.
    pub async fn append(&self, record: &NewSaleRecord) -> DbResult<String> {
        let id = generate_id();
        debug!(
            id = %id,
            invoice = %record.invoice_number,
            part_id = %record.part_id,
            "Appending sale record"
        );

        sqlx::query(&format!(
            "INSERT INTO sales_history ({SALE_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ))
        .bind(&id)
        .bind(&record.part_id)
        .bind(&record.part_number)
        .bind(&record.part_name)
        .bind(&record.customer_name)
        .bind(record.quantity_sold)
        .bind(record.selling_price.to_storage_string())
        .bind(record.total_amount.to_storage_string())
        .bind(i64::from(record.gst_rate.percent()))
        .bind(record.sgst_amount.to_storage_string())
        .bind(record.cgst_amount.to_storage_string())
        .bind(&record.shop_email)
        .bind(&record.invoice_number)
        .bind(record.sale_date)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// A shop's records, newest first.
    pub async fn list_by_shop(&self, shop_email: &str) -> DbResult<Vec<SalesHistoryRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales_history WHERE shop_email = ?1 \
             ORDER BY sale_date DESC, rowid DESC"
        ))
        .bind(shop_email)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    /// The lines of one invoice of one shop, in the order they were sold.
    pub async fn list_by_invoice(
        &self,
        shop_email: &str,
        invoice_number: &str,
    ) -> DbResult<Vec<SalesHistoryRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales_history \
             WHERE shop_email = ?1 AND invoice_number = ?2 \
             ORDER BY sale_date, rowid"
        ))
        .bind(shop_email)
        .bind(invoice_number)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    /// Counts a shop's records.
    pub async fn count_by_shop(&self, shop_email: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales_history WHERE shop_email = ?1")
                .bind(shop_email)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Generates an invoice number in format: INV-<epoch millis>-<5 chars>
///
/// ## Example
/// `INV-1792224000000-3F9A1`
///
/// Collisions are unlikely but not prevented; the ledger does not enforce
/// uniqueness.
pub fn generate_invoice_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(5).collect();
    format!("INV-{}-{}", millis, suffix.to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::test_db;
    use spares_core::{GstRate, Money};

    fn record(invoice: &str, customer: &str, qty: i64) -> NewSaleRecord {
        NewSaleRecord {
            part_id: "P1".into(),
            part_number: "BRK-001".into(),
            part_name: "Brake Pad".into(),
            customer_name: customer.into(),
            quantity_sold: qty,
            selling_price: Money::from_rupees(100),
            total_amount: Money::from_rupees(118 * qty),
            gst_rate: GstRate::Eighteen,
            sgst_amount: Money::from_rupees(9 * qty),
            cgst_amount: Money::from_rupees(9 * qty),
            shop_email: "shop@example.com".into(),
            invoice_number: invoice.into(),
            sale_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = test_db().await;
        let repo = db.sales();

        let mut exact = record("INV-1", "Anil", 1);
        exact.sgst_amount = Money::parse("2.50125").unwrap();
        let id = repo.append(&exact).await.unwrap();

        let stored = repo.list_by_shop("shop@example.com").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].sgst_amount, Money::parse("2.50125").unwrap());
        assert_eq!(stored[0].gst_rate, GstRate::Eighteen);
    }

    #[tokio::test]
    async fn test_invoice_groups_lines_in_order() {
        let db = test_db().await;
        let repo = db.sales();

        repo.append(&record("INV-1", "Anil", 1)).await.unwrap();
        repo.append(&record("INV-2", "Meera", 2)).await.unwrap();
        repo.append(&record("INV-1", "Anil", 3)).await.unwrap();

        let lines = repo.list_by_invoice("shop@example.com", "INV-1").await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity_sold, 1);
        assert_eq!(lines[1].quantity_sold, 3);
        assert!(repo.list_by_invoice("other@example.com", "INV-1").await.unwrap().is_empty());
        assert_eq!(repo.count_by_shop("shop@example.com").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ledger_is_append_only() {
        let db = test_db().await;
        let id = db.sales().append(&record("INV-1", "Anil", 1)).await.unwrap();

        let update = sqlx::query("UPDATE sales_history SET quantity_sold = 99 WHERE id = ?1")
            .bind(&id)
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(update, Err(DbError::ConstraintViolation(_))));

        let delete = sqlx::query("DELETE FROM sales_history WHERE id = ?1")
            .bind(&id)
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(delete, Err(DbError::ConstraintViolation(_))));
    }

    #[test]
    fn test_invoice_number_format() {
        let number = generate_invoice_number();
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 5);
        assert_eq!(parts[2], parts[2].to_uppercase());
    }
}
