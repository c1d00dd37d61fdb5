//! Product repository: the Postgres-backed catalog.

use sqlx::PgPool;

use paperbark_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{Product, ProductQuery};
use crate::store::Catalog;

/// Row shape shared by all product queries.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    is_available: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, is_available, created_at, updated_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl Catalog for ProductRepository<'_> {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        // The ORDER BY clause comes from the ProductSort whitelist, never
        // from user input.
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_available = TRUE \
               AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
             ORDER BY {}",
            query.sort.order_by()
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(query.search.as_deref())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
