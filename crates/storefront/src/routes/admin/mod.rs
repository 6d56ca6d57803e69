//! Staff-only admin pages.

pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::RequireStaff;
use crate::services::media::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Request body limit for product forms: one image plus the text fields.
const MAX_PRODUCT_FORM_BYTES: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Create the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(index))
        .route("/admin/users/", get(users::index))
        .route("/admin/products/", get(products::index))
        .route(
            "/admin/products/new/",
            get(products::new_page)
                .post(products::create)
                .layer(DefaultBodyLimit::max(MAX_PRODUCT_FORM_BYTES)),
        )
        .route(
            "/admin/products/{id}/edit/",
            get(products::edit_page)
                .post(products::update)
                .layer(DefaultBodyLimit::max(MAX_PRODUCT_FORM_BYTES)),
        )
        .route("/admin/products/{id}/delete/", post(products::delete))
}

async fn index(_staff: RequireStaff) -> Redirect {
    Redirect::to("/admin/users/")
}
