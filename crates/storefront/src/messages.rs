//! User-facing message strings.
//!
//! Kept in one place so a locale layer can swap them out.

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const FIELD_REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const DUPLICATE_SKU: &str = "Product with this SKU already exists.";
pub const INVALID_PRICE: &str = "Enter a valid price with at most 2 decimal places.";
pub const WELCOME: &str = "Hello! And welcome";
pub const CONTACT_HEADING: &str = "Send us an email!";
