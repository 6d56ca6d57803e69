//! Product repository for database operations.

use sqlx::PgPool;

use shopfront_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, sku, image, created_at, updated_at";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a new product with a freshly generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        self.create_with_id(ProductId::generate(), input).await
    }

    /// Insert a new product under a caller-chosen ID.
    ///
    /// Used when an uploaded image has already been stored under the ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID or SKU is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_id(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO shop.products (id, name, description, category, price, sku, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.price)
        .bind(&input.sku)
        .bind(input.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product"))
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Conflict` if the new SKU is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE shop.products
            SET name = $2, description = $3, category = $4, price = $5, sku = $6,
                image = $7, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.price)
        .bind(&input.sku)
        .bind(input.image.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a product with this SKU exists (optionally ignoring one product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sku_taken(
        &self,
        sku: &str,
        except: Option<ProductId>,
    ) -> Result<bool, RepositoryError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shop.products WHERE sku = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(sku)
        .bind(except)
        .fetch_one(self.pool)
        .await?;

        Ok(taken)
    }
}
