//! Seeds a database with sample data for development and demos.
//!
//! ```text
//! cargo run --bin seed -- [path/to/comptoir.db]
//! ```
//!
//! Defaults to `comptoir-dev.db` in the working directory. Running against
//! an already-seeded file will fail on duplicate invoice numbers; point it
//! at a fresh path instead.

use comptoir_core::{LineRequest, NewCategory, NewClient, NewProduct, NewSupplier, PaymentMethod};
use comptoir_db::{CreatePurchase, CreateSale, Database, DbConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "comptoir-dev.db".to_string());

    info!(path = %path, "Seeding database");
    let db = Database::new(DbConfig::new(&path)).await?;

    let papeterie = db
        .categories()
        .add(&NewCategory {
            name: "Papeterie".to_string(),
            description: Some("Fournitures de bureau".to_string()),
        })
        .await?;
    let informatique = db
        .categories()
        .add(&NewCategory {
            name: "Informatique".to_string(),
            description: None,
        })
        .await?;

    let stylo = db
        .products()
        .add(&NewProduct {
            name: "Stylo bleu".to_string(),
            category_id: Some(papeterie),
            purchase_price_cents: 80,
            selling_price_cents: 150,
            min_stock: 20,
            barcode: Some("6130000123457".to_string()),
            ..Default::default()
        })
        .await?;
    let cahier = db
        .products()
        .add(&NewProduct {
            name: "Cahier 96 pages".to_string(),
            category_id: Some(papeterie),
            purchase_price_cents: 250,
            selling_price_cents: 450,
            min_stock: 10,
            ..Default::default()
        })
        .await?;
    let clavier = db
        .products()
        .add(&NewProduct {
            name: "Clavier USB".to_string(),
            category_id: Some(informatique),
            purchase_price_cents: 120_000,
            selling_price_cents: 190_000,
            min_stock: 3,
            ..Default::default()
        })
        .await?;

    let client = db
        .clients()
        .add(&NewClient {
            name: "Aya Benali".to_string(),
            phone: Some("+213 555 12 34 56".to_string()),
            email: Some("aya@example.com".to_string()),
            ..Default::default()
        })
        .await?;
    let supplier = db
        .suppliers()
        .add(&NewSupplier {
            name: "Atlas Papeterie".to_string(),
            phone: Some("+213 21 98 76 54".to_string()),
            ..Default::default()
        })
        .await?;

    db.settings().set("shop_name", "Comptoir Central").await?;
    db.settings().set("currency", "DZD").await?;
    db.settings().set("default_tax_bps", "1900").await?;

    // initial inventory through the order engine, not raw stock edits
    db.orders()
        .create_purchase(&CreatePurchase {
            reference: "PUR-0001".to_string(),
            supplier_id: Some(supplier),
            lines: vec![
                LineRequest::new(stylo, 100, 80),
                LineRequest::new(cahier, 50, 250),
                LineRequest::new(clavier, 5, 120_000),
            ],
            payment_method: PaymentMethod::Transfer,
            tax_rate_bps: 1000,
            notes: None,
        })
        .await?;

    db.orders()
        .create_sale(&CreateSale {
            invoice_number: "INV-0001".to_string(),
            client_id: Some(client),
            lines: vec![
                LineRequest::new(stylo, 10, 150),
                LineRequest::discounted(cahier, 4, 450, 500),
            ],
            payment_method: PaymentMethod::Cash,
            tax_rate_bps: 1900,
            discount_cents: 0,
            notes: Some("Vente de démonstration".to_string()),
        })
        .await?;
    db.orders()
        .create_sale(&CreateSale {
            invoice_number: "INV-0002".to_string(),
            client_id: None,
            lines: vec![LineRequest::new(clavier, 1, 190_000)],
            payment_method: PaymentMethod::Card,
            tax_rate_bps: 1900,
            discount_cents: 0,
            notes: None,
        })
        .await?;

    let totals = db.stats().totals().await?;
    println!("{}", serde_json::to_string_pretty(&totals)?);

    info!("Seed complete");
    Ok(())
}
