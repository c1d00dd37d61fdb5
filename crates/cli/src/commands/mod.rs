//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connect to the database named by `PAPERBARK_DATABASE_URL`.
///
/// Loads `.env` first so local development picks up the same configuration
/// as the storefront binary.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let database_url = SecretString::from(
        std::env::var("PAPERBARK_DATABASE_URL")
            .map_err(|_| "PAPERBARK_DATABASE_URL is not set")?,
    );

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.expose_secret())
        .await?;

    Ok(pool)
}
