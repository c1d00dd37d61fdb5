//! Cart repository.
//!
//! Every statement here is scoped to the requesting user's cart: line IDs
//! are only ever dereferenced through a join against `carts.user_id`, so a
//! foreign line ID behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use paperbark_core::{CartId, CartLineId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};
use crate::store::CartStore;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    cart_id: CartId,
    product_id: ProductId,
    product_name: String,
    unit_price: Price,
    is_available: bool,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "cart line {} has negative quantity {}",
                row.id, row.quantity
            ))
        })?;
        Ok(Self {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: row.unit_price,
            is_available: row.is_available,
            quantity,
            added_at: row.added_at,
        })
    }
}

/// Joined line columns used by every line-returning query.
const LINE_COLUMNS: &str = "l.id, l.cart_id, l.product_id, \
    p.name AS product_name, p.price AS unit_price, p.is_available, \
    l.quantity, l.added_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get-or-create the user's cart row.
    async fn ensure_cart(&self, user: UserId) -> Result<CartRow, RepositoryError> {
        sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user)
            .execute(self.pool)
            .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at FROM carts WHERE user_id = $1",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }
}

impl CartStore for CartRepository<'_> {
    async fn open(&self, user: UserId) -> Result<Cart, RepositoryError> {
        let cart = self.ensure_cart(user).await?;

        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines l \
             JOIN products p ON p.id = l.product_id \
             WHERE l.cart_id = $1 \
             ORDER BY l.added_at, l.id"
        ))
        .bind(cart.id)
        .fetch_all(self.pool)
        .await?;

        let lines = rows
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart {
            id: cart.id,
            user_id: cart.user_id,
            lines,
            created_at: cart.created_at,
        })
    }

    async fn find_line(
        &self,
        user: UserId,
        line: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines l \
             JOIN products p ON p.id = l.product_id \
             JOIN carts c ON c.id = l.cart_id \
             WHERE l.id = $2 AND c.user_id = $1"
        ))
        .bind(user)
        .bind(line)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    async fn add_line(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<CartLine, RepositoryError> {
        self.ensure_cart(user).await?;

        // Single upsert: a concurrent add for the same product lands on the
        // DO UPDATE arm instead of losing the increment.
        let row = sqlx::query_as::<_, CartLineRow>(
            "WITH target AS ( \
                 SELECT id FROM carts WHERE user_id = $1 \
             ), upserted AS ( \
                 INSERT INTO cart_lines (cart_id, product_id, quantity) \
                 SELECT target.id, $2, 1 FROM target \
                 ON CONFLICT (cart_id, product_id) \
                 DO UPDATE SET quantity = cart_lines.quantity + 1 \
                 RETURNING id, cart_id, product_id, quantity, added_at \
             ) \
             SELECT u.id, u.cart_id, u.product_id, \
                    p.name AS product_name, p.price AS unit_price, p.is_available, \
                    u.quantity, u.added_at \
             FROM upserted u JOIN products p ON p.id = u.product_id",
        )
        .bind(user)
        .bind(product)
        .fetch_one(self.pool)
        .await?;

        CartLine::try_from(row)
    }

    async fn set_line_quantity(
        &self,
        user: UserId,
        line: CartLineId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let quantity = i32::try_from(quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("quantity {quantity} out of range"))
        })?;

        let result = sqlx::query(
            "UPDATE cart_lines l SET quantity = $3 \
             FROM carts c \
             WHERE l.id = $2 AND c.id = l.cart_id AND c.user_id = $1",
        )
        .bind(user)
        .bind(line)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_line(&self, user: UserId, line: CartLineId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_lines l \
             USING carts c \
             WHERE l.id = $2 AND c.id = l.cart_id AND c.user_id = $1",
        )
        .bind(user)
        .bind(line)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_lines l \
             USING carts c \
             WHERE c.id = l.cart_id AND c.user_id = $1",
        )
        .bind(user)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
