//! Order repository.
//!
//! Order creation is the one multi-statement write in the system: the order
//! row, its lines, and the cart-clear run inside a single transaction so a
//! failure at any point leaves the cart intact and no partial order behind.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use paperbark_core::{Email, OrderId, OrderLineId, OrderStatus, Phone, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderLine, ShippingDetails};
use crate::store::OrderStore;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: String,
    total_price: Price,
    shipping_address: String,
    phone: String,
    email: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Price,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order line {} has negative quantity {}",
                row.id, row.quantity
            ))
        })?;
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity,
            unit_price: row.unit_price,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, status, total_price, \
    shipping_address, phone, email, notes, created_at, updated_at";

const LINE_COLUMNS: &str = "l.id, l.order_id, l.product_id, \
    p.name AS product_name, l.quantity, l.unit_price";

/// Map an order row plus its line rows into the domain model, validating
/// the stored status and contact fields on the way out.
fn map_order(row: OrderRow, line_rows: Vec<OrderLineRow>) -> Result<Order, RepositoryError> {
    let status = row.status.parse::<OrderStatus>().map_err(|e| {
        RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
    })?;
    let phone = Phone::parse(&row.phone).map_err(|e| {
        RepositoryError::DataCorruption(format!("order {}: invalid phone: {e}", row.id))
    })?;
    let email = Email::parse(&row.email).map_err(|e| {
        RepositoryError::DataCorruption(format!("order {}: invalid email: {e}", row.id))
    })?;

    let lines = line_rows
        .into_iter()
        .map(OrderLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Order {
        id: row.id,
        user_id: row.user_id,
        status,
        total_price: row.total_price,
        shipping: ShippingDetails {
            address: row.shipping_address,
            phone,
            email,
            notes: row.notes,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
        lines,
    })
}

/// Fetch the joined lines of one order from any executor (pool or open
/// transaction).
async fn fetch_lines<'e, E>(executor: E, order: OrderId) -> Result<Vec<OrderLineRow>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, OrderLineRow>(&format!(
        "SELECT {LINE_COLUMNS} FROM order_lines l \
         JOIN products p ON p.id = l.product_id \
         WHERE l.order_id = $1 \
         ORDER BY l.id"
    ))
    .bind(order)
    .fetch_all(executor)
    .await
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn create(&self, user: UserId, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
                 (user_id, status, total_price, shipping_address, phone, email, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_price)
        .bind(&order.shipping.address)
        .bind(order.shipping.phone.as_str())
        .bind(order.shipping.email.as_str())
        .bind(order.shipping.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;
            sqlx::query(
                "INSERT INTO order_lines (order_id, product_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        // Same transaction as the inserts above: a crash cannot leave both
        // the order and the now-redundant cart lines live.
        sqlx::query(
            "DELETE FROM cart_lines l \
             USING carts c \
             WHERE c.id = l.cart_id AND c.user_id = $1",
        )
        .bind(user)
        .execute(&mut *tx)
        .await?;

        let line_rows = fetch_lines(&mut *tx, row.id).await?;

        tx.commit().await?;

        map_order(row, line_rows)
    }

    async fn get(&self, user: UserId, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $2 AND user_id = $1"
        ))
        .bind(user)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let line_rows = fetch_lines(self.pool, row.id).await?;
                Ok(Some(map_order(row, line_rows)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let line_rows = fetch_lines(self.pool, row.id).await?;
            orders.push(map_order(row, line_rows)?);
        }
        Ok(orders)
    }

    async fn list_with_status(
        &self,
        user: UserId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user)
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let line_rows = fetch_lines(self.pool, row.id).await?;
            orders.push(map_order(row, line_rows)?);
        }
        Ok(orders)
    }

    async fn transition(
        &self,
        user: UserId,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        // Compare-and-set on the status column: a concurrent transition that
        // got there first makes this a no-op reported as `false`.
        let result = sqlx::query(
            "UPDATE orders SET status = $4, updated_at = now() \
             WHERE id = $2 AND user_id = $1 AND status = $3",
        )
        .bind(user)
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, user: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user)
            .fetch_one(self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
