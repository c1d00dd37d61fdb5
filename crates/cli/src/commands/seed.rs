//! Seed the catalog with sample products for local development.

use rust_decimal::Decimal;

/// Sample products: (name, description, price, available).
const SAMPLE_PRODUCTS: &[(&str, &str, Decimal, bool)] = &[
    (
        "The Paperbark Field Guide",
        "A pocket guide to identifying paperbark trees.",
        Decimal::from_parts(2499, 0, 0, false, 2),
        true,
    ),
    (
        "Letterpress Notebook",
        "A5 notebook with letterpress cover, 128 pages.",
        Decimal::from_parts(1250, 0, 0, false, 2),
        true,
    ),
    (
        "Fountain Pen Ink, Sepia",
        "50ml bottled ink.",
        Decimal::from_parts(899, 0, 0, false, 2),
        true,
    ),
    (
        "Wax Seal Kit",
        "Brass stamp, two wax sticks.",
        Decimal::from_parts(3200, 0, 0, false, 2),
        false,
    ),
];

/// Insert the sample catalog. Existing products with the same name are left
/// alone, so seeding is safe to repeat.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let mut inserted = 0_u32;
    for (name, description, price, is_available) in SAMPLE_PRODUCTS {
        let result = sqlx::query(
            "INSERT INTO products (name, description, price, is_available) \
             SELECT $1, $2, $3, $4 \
             WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(is_available)
        .execute(&pool)
        .await?;

        inserted += u32::try_from(result.rows_affected()).unwrap_or(0);
    }

    tracing::info!("Seeded {inserted} products");
    Ok(())
}
