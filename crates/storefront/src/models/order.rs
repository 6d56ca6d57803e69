//! Order (cart) types.

use chrono::{DateTime, Utc};

use shopfront_core::{OrderId, Price, UserId};

use super::Product;

/// An order row. The user's active order is their cart.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active order together with its products.
#[derive(Debug, Clone)]
pub struct Cart {
    pub order: Order,
    pub products: Vec<Product>,
}

impl Cart {
    /// Sum of the prices of all products in the cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.products.iter().map(|p| p.price).sum()
    }
}
