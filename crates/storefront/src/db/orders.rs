//! Order repository: the active order doubles as the user's cart.
//!
//! The `orders_one_active_per_user` partial unique index guarantees at most
//! one active order per user; get-or-create leans on it so concurrent
//! add-to-cart requests converge on the same row.

use sqlx::{PgConnection, PgPool};

use shopfront_core::{OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, Order, Product};

const ORDER_COLUMNS: &str = "id, user_id, is_active, created_at, updated_at";

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

    /// Attach a product to the user's active order, creating the order lazily.
    ///
    /// Adding a product that is already in the order leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_product_to_active(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = get_or_create_active(&mut tx, user_id).await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_products (order_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (order_id, product_id) DO NOTHING
            ",
        )
        .bind(order.id)
        .bind(product_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE shop.orders SET updated_at = now() WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// The user's active order with its products, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn active_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE user_id = $1 AND is_active"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let products = self.products_in(order.id).await?;
        Ok(Some(Cart { order, products }))
    }

    /// Products attached to an order, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn products_in(&self, order_id: OrderId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.name, p.description, p.category, p.price, p.sku, p.image,
                   p.created_at, p.updated_at
            FROM shop.order_products op
            JOIN shop.products p ON p.id = op.product_id
            WHERE op.order_id = $1
            ORDER BY op.added_at, p.name
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}

/// Fetch the user's active order, creating it if there is none.
async fn get_or_create_active(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Order, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.orders (id, user_id, is_active)
        VALUES ($1, $2, TRUE)
        ON CONFLICT (user_id) WHERE is_active DO NOTHING
        ",
    )
    .bind(OrderId::generate())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE user_id = $1 AND is_active"
    ))
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    order.ok_or_else(|| {
        RepositoryError::DataCorruption(format!("active order for user {user_id} vanished"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::routes::test_support::{create_product, create_user};

    async fn active_order_count(pool: &PgPool, user_id: UserId) -> i64 {
        sqlx::query_scalar("SELECT count(*) FROM shop.orders WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_first_add_creates_the_active_order(pool: PgPool) {
        let user = create_user(&pool, "cart@example.com").await;
        let mug = create_product(&pool, "Mug", "MUG-1").await;
        let towel = create_product(&pool, "Towel", "TOWEL-1").await;
        let orders = OrderRepository::new(&pool);

        assert!(orders.active_cart(user.id).await.unwrap().is_none());

        let first = orders.add_product_to_active(user.id, mug.id).await.unwrap();
        let second = orders.add_product_to_active(user.id, towel.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.is_active);
        assert_eq!(active_order_count(&pool, user.id).await, 1);

        let cart = orders.active_cart(user.id).await.unwrap().unwrap();
        assert_eq!(cart.order.id, first.id);
        assert_eq!(cart.products.len(), 2);
        assert_eq!(cart.total().to_string(), "25.00");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_adding_the_same_product_twice_keeps_one_row(pool: PgPool) {
        let user = create_user(&pool, "twice@example.com").await;
        let mug = create_product(&pool, "Mug", "MUG-1").await;
        let orders = OrderRepository::new(&pool);

        orders.add_product_to_active(user.id, mug.id).await.unwrap();
        orders.add_product_to_active(user.id, mug.id).await.unwrap();

        let cart = orders.active_cart(user.id).await.unwrap().unwrap();
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].id, mug.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_missing_product_is_not_found_and_creates_no_order(pool: PgPool) {
        let user = create_user(&pool, "ghost@example.com").await;
        let orders = OrderRepository::new(&pool);

        let result = orders
            .add_product_to_active(user.id, ProductId::generate())
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(orders.active_cart(user.id).await.unwrap().is_none());
        assert_eq!(active_order_count(&pool, user.id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_concurrent_first_adds_share_one_order(pool: PgPool) {
        let user = create_user(&pool, "race@example.com").await;
        let mug = create_product(&pool, "Mug", "MUG-1").await;
        let towel = create_product(&pool, "Towel", "TOWEL-1").await;
        let orders = OrderRepository::new(&pool);

        let (a, b) = tokio::join!(
            orders.add_product_to_active(user.id, mug.id),
            orders.add_product_to_active(user.id, towel.id),
        );

        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(active_order_count(&pool, user.id).await, 1);
        let cart = orders.active_cart(user.id).await.unwrap().unwrap();
        assert_eq!(cart.products.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_second_active_order_is_rejected_by_the_schema(pool: PgPool) {
        let user = create_user(&pool, "index@example.com").await;
        let mug = create_product(&pool, "Mug", "MUG-1").await;
        OrderRepository::new(&pool)
            .add_product_to_active(user.id, mug.id)
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO shop.orders (id, user_id, is_active) VALUES ($1, $2, TRUE)",
        )
        .bind(OrderId::generate())
        .bind(user.id)
        .execute(&pool)
        .await;

        let err = result.unwrap_err();
        assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
    }
}
