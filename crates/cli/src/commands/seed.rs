//! Seed the catalog with demo products.
//!
//! Products whose SKU already exists are skipped, so the command can be run
//! repeatedly against the same database.

use shopfront_core::Price;
use shopfront_storefront::db::ProductRepository;
use shopfront_storefront::models::ProductInput;
use tracing::info;

use super::{CommandError, connect};

/// A demo product: name, description, category, price in cents, SKU.
type DemoProduct = (&'static str, &'static str, &'static str, i64, &'static str);

const DEMO_PRODUCTS: &[DemoProduct] = &[
    (
        "Enamel Mug",
        "Speckled enamel camping mug, 350 ml.",
        "Kitchen",
        1400,
        "MUG-ENAMEL-350",
    ),
    (
        "Linen Tea Towel",
        "Stonewashed linen, 50 x 70 cm.",
        "Kitchen",
        1250,
        "TOWEL-LINEN",
    ),
    (
        "Canvas Tote",
        "Heavy cotton canvas tote with inside pocket.",
        "Bags",
        2200,
        "TOTE-CANVAS",
    ),
    (
        "Beeswax Candle",
        "Hand-poured pillar candle, roughly 30 hours.",
        "Home",
        1800,
        "CANDLE-BEESWAX",
    ),
    (
        "Notebook, Dot Grid",
        "A5, 120 pages of 100 gsm paper.",
        "Stationery",
        995,
        "NOTE-A5-DOT",
    ),
];

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool);

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for &(name, description, category, cents, sku) in DEMO_PRODUCTS {
        if products.sku_taken(sku, None).await? {
            skipped += 1;
            continue;
        }

        let input = ProductInput {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price: Price::from_cents(cents)?,
            sku: sku.to_string(),
            image: None,
        };
        let product = products.create(&input).await?;
        info!(product_id = %product.id, sku, "Seeded product");
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_demo_skus_are_unique() {
        let skus: HashSet<_> = DEMO_PRODUCTS.iter().map(|p| p.4).collect();
        assert_eq!(skus.len(), DEMO_PRODUCTS.len());
    }

    #[test]
    fn test_demo_prices_are_valid() {
        for &(name, _, _, cents, _) in DEMO_PRODUCTS {
            assert!(Price::from_cents(cents).is_ok(), "bad price for {name}");
        }
    }
}
