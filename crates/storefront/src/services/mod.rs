//! Business logic services for the storefront.
//!
//! - `auth` - Email + password registration and login
//! - `email` - Contact form delivery over SMTP or the in-memory outbox
//! - `export` - CSV export of catalog products
//! - `media` - Storage for uploaded product images

pub mod auth;
pub mod email;
pub mod export;
pub mod media;
