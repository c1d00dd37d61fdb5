//! Run the storefront database migrations.

/// Migrations embedded from the storefront crate at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../storefront/migrations");

/// Run all pending migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
