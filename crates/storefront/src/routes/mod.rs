//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Main page
//!
//! # Products
//! GET  /products/                     - Product list
//! GET  /products/{id}/                - Product detail
//! GET  /products/csv/                 - CSV export of every product (auth)
//! GET  /products/{id}/csv/            - CSV export of one product (auth)
//!
//! # Cart (auth)
//! GET  /cart/                         - Products in the active order
//! GET  /cart/add/{id}/                - Attach a product, redirect to the list
//!
//! # Contact
//! GET  /contact-us/                   - Contact form
//! POST /contact-us/                   - Validate and send
//!
//! # Auth
//! GET  /auth/login/      POST /auth/login/
//! GET  /auth/register/   POST /auth/register/
//! POST /auth/logout/
//!
//! # Admin (staff)
//! GET  /admin/                        - Redirect to the user list
//! GET  /admin/users/                  - User list (?sort=email | -email)
//! GET  /admin/products/               - Product list
//! GET  /admin/products/new/           POST /admin/products/new/
//! GET  /admin/products/{id}/edit/     POST /admin/products/{id}/edit/
//! POST /admin/products/{id}/delete/
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod home;
pub mod products;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the product routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(products::index))
        .route("/products/csv/", get(products::export_csv))
        .route("/products/{id}/", get(products::show))
        .route("/products/{id}/csv/", get(products::export_product_csv))
}

/// Create the cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(cart::show))
        .route("/cart/add/{id}/", get(cart::add))
}

/// Create the auth routes; credential submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route(
            "/auth/login/",
            get(auth::login_page).merge(post(auth::login).layer(limiter.clone())),
        )
        .route(
            "/auth/register/",
            get(auth::register_page).merge(post(auth::register).layer(limiter)),
        )
        .route("/auth/logout/", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route(
            "/contact-us/",
            get(contact::contact_page).post(contact::submit),
        )
        .merge(product_routes())
        .merge(cart_routes())
        .merge(auth_routes())
        .merge(admin::routes())
}
