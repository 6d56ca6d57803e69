//! Cart route handlers.
//!
//! The cart is the user's active order; it is created the first time a
//! product is added.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::instrument;

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::messages;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::products::{ProductView, parse_product_id};
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
    pub total: String,
}

/// Display the products in the user's active order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<CartTemplate> {
    let cart = OrderRepository::new(state.pool())
        .active_cart(user.id)
        .await?;

    let media = &state.config().media;
    let (products, total) = match cart {
        Some(cart) => (
            cart.products
                .iter()
                .map(|p| ProductView::new(p, media))
                .collect(),
            cart.total().to_string(),
        ),
        None => (Vec::new(), shopfront_core::Price::ZERO.to_string()),
    };

    Ok(CartTemplate {
        current_user: Some(user),
        products,
        total,
    })
}

/// Attach a product to the user's active order and return to the list.
#[instrument(skip(state, user), fields(user_id = %user.id, product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let product_id = parse_product_id(&id)?;

    let order = OrderRepository::new(state.pool())
        .add_product_to_active(user.id, product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(order_id = %order.id, "Product added to cart");
    Ok(Redirect::to("/products/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use shopfront_core::ProductId;

    use crate::db::OrderRepository;
    use crate::messages;
    use crate::routes::test_support::{
        TestApp, body_string, create_product, create_user, get_request,
    };

    #[tokio::test]
    async fn test_add_requires_login() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request(
                "/cart/add/6f1c7a4e-9d8b-4c2a-8e3f-1a2b3c4d5e6f/",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/auth/login/?next=%2Fcart%2Fadd%2F"));
    }

    #[tokio::test]
    async fn test_add_with_malformed_id_is_not_found() {
        let app = TestApp::new();
        let cookie = app.login(false).await;

        let response = app
            .router()
            .oneshot(get_request("/cart/add/42/", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, messages::PRODUCT_NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_add_twice_lists_the_product_once(pool: sqlx::PgPool) {
        let user = create_user(&pool, "cart@example.com").await;
        let mug = create_product(&pool, "Speckled Mug", "MUG-1").await;

        let app = TestApp::with_pool(pool);
        let cookie = app.login_as(user.id, false).await;
        let add = format!("/cart/add/{}/", mug.id);

        for _ in 0..2 {
            let response = app
                .router()
                .oneshot(get_request(&add, Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()[header::LOCATION], "/products/");
        }

        let response = app
            .router()
            .oneshot(get_request("/cart/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(body.matches("Speckled Mug").count(), 1);
        assert!(body.contains("12.50"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_add_missing_product_is_not_found_and_leaves_no_cart(pool: sqlx::PgPool) {
        let user = create_user(&pool, "nocart@example.com").await;

        let app = TestApp::with_pool(pool.clone());
        let cookie = app.login_as(user.id, false).await;
        let response = app
            .router()
            .oneshot(get_request(
                &format!("/cart/add/{}/", ProductId::generate()),
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, messages::PRODUCT_NOT_FOUND);
        assert!(
            OrderRepository::new(&pool)
                .active_cart(user.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
