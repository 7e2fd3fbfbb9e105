//! # Seed Data Generator
//!
//! Populates the database with a demo shop, its spare parts and an admin
//! account for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/spares.db with the full catalog
//! cargo run -p spares-server --bin seed
//!
//! # Limit the number of parts
//! cargo run -p spares-server --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p spares-server --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Shop `demo@spares.local` / `demo123` (GST registered)
//! - Admin `admin@spares.local` / `admin123`
//! - Parts across brakes, engine, electrical, suspension and body, each
//!   with an HSN code and a GST slab

use std::env;

use anyhow::anyhow;
use chrono::Utc;
use spares_core::{GstRate, Money, Part, PartDraft, ShopOwner};
use spares_db::{generate_id, Database, DbConfig};
use spares_server::auth::hash_password;

const DEMO_SHOP_EMAIL: &str = "demo@spares.local";
const DEMO_SHOP_PASSWORD: &str = "demo123";
const DEMO_ADMIN_EMAIL: &str = "admin@spares.local";
const DEMO_ADMIN_PASSWORD: &str = "admin123";

/// (prefix, HSN code, GST slab, part names)
const CATALOG: &[(&str, &str, GstRate, &[&str])] = &[
    (
        "BRK",
        "8708",
        GstRate::TwentyEight,
        &[
            "Front Brake Pad Set",
            "Rear Brake Shoe",
            "Brake Disc Rotor",
            "Brake Master Cylinder",
            "Brake Fluid DOT4",
        ],
    ),
    (
        "ENG",
        "8409",
        GstRate::Eighteen,
        &[
            "Piston Ring Set",
            "Timing Belt",
            "Engine Mount",
            "Cylinder Head Gasket",
            "Oil Filter",
            "Air Filter",
        ],
    ),
    (
        "ELC",
        "8511",
        GstRate::Eighteen,
        &[
            "Iridium Spark Plug",
            "Ignition Coil",
            "Starter Motor",
            "Alternator",
            "Headlamp Bulb H4",
        ],
    ),
    (
        "SUS",
        "8708",
        GstRate::TwentyEight,
        &[
            "Front Shock Absorber",
            "Coil Spring",
            "Ball Joint",
            "Tie Rod End",
            "Stabilizer Link",
        ],
    ),
    (
        "BDY",
        "4016",
        GstRate::Twelve,
        &[
            "Wiper Blade 20in",
            "Door Weatherstrip",
            "Mud Flap Set",
            "Side Mirror Glass",
        ],
    ),
    (
        "LUB",
        "2710",
        GstRate::Five,
        &["Engine Oil 1L", "Gear Oil 1L", "Grease 500g"],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./data/spares.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Spares POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of parts to generate (default: whole catalog)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/spares.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Spares POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    if let Some(dir) = std::path::Path::new(&db_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let admin_hash = hash_password(DEMO_ADMIN_PASSWORD).map_err(|e| anyhow!(e.message))?;
    db.admins().upsert(DEMO_ADMIN_EMAIL, &admin_hash).await?;
    println!("✓ Admin {} / {}", DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD);

    if db.shops().email_exists(DEMO_SHOP_EMAIL).await? {
        println!("⚠ Demo shop {} already exists", DEMO_SHOP_EMAIL);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let shop = ShopOwner {
        id: generate_id(),
        email: DEMO_SHOP_EMAIL.to_string(),
        owner_name: "Ravi Kumar".to_string(),
        shop_name: "Kumar Auto Spares".to_string(),
        shop_location: "Lamington Road, Mumbai".to_string(),
        phone: "9820012345".to_string(),
        gst_number: Some("27ABCDE1234F1Z5".to_string()),
        password_hash: hash_password(DEMO_SHOP_PASSWORD).map_err(|e| anyhow!(e.message))?,
        created_at: now,
        updated_at: now,
    };
    db.shops().insert(&shop).await?;
    println!("✓ Shop {} / {}", DEMO_SHOP_EMAIL, DEMO_SHOP_PASSWORD);

    println!();
    println!("Generating parts...");

    let mut generated = 0;
    let catalog = CATALOG
        .iter()
        .flat_map(|(prefix, hsn, rate, names)| {
            names.iter().map(move |name| (*prefix, *hsn, *rate, *name))
        })
        .take(count);

    for (seed, (prefix, hsn, rate, name)) in catalog.enumerate() {
        let part = generate_part(prefix, hsn, rate, name, seed);

        if let Err(e) = db.parts().insert(&part).await {
            eprintln!("Failed to insert {}: {}", part.part_number, e);
            continue;
        }

        generated += 1;
    }

    println!("✓ Generated {} parts", generated);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one part with deterministic price and stock.
fn generate_part(prefix: &str, hsn: &str, rate: GstRate, name: &str, seed: usize) -> Part {
    // Price: ₹150 - ₹2,490 in steps of 10
    let price = 150 + ((seed * 370) % 2350) as i64 / 10 * 10;

    // MRP 10-30% above the selling price
    let markup = 110 + (seed % 21) as i64;

    let draft = PartDraft {
        part_number: format!("{}-{:04}", prefix, 100 + seed),
        name: name.to_string(),
        description: format!("{} for popular hatchbacks and sedans", name),
        price: Money::from_rupees(price),
        original_price: Money::from_rupees(price * markup / 100),
        quantity_owned: (seed % 40) as i64 + 2,
        gst_rate: rate,
        hsn_code: Some(hsn.to_string()),
        image: None,
    };

    Part::from_draft(generate_id(), DEMO_SHOP_EMAIL, draft, Utc::now())
}
