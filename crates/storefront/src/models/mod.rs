//! Domain models for the storefront.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{Cart, Order};
pub use product::{Product, ProductInput};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
