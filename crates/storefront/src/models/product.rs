//! Catalog product types.

use chrono::{DateTime, Utc};

use shopfront_core::{Price, ProductId};

/// A catalog product.
///
/// Read-only from the storefront's point of view; rows are created and
/// edited through the admin.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    /// Stock-keeping unit, unique across the catalog.
    pub sku: String,
    /// Image path relative to the media root (e.g. `products/<id>-mug.jpg`).
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field values for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub sku: String,
    pub image: Option<String>,
}
