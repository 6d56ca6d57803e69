//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use shopfront_core::ProductId;

use crate::config::MediaConfig;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::messages;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Product};
use crate::services::export;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub sku: String,
    pub image_url: Option<String>,
}

impl ProductView {
    /// Build a view, resolving the stored image path against the media URL.
    #[must_use]
    pub fn new(product: &Product, media: &MediaConfig) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            sku: product.sku.clone(),
            image_url: product
                .image
                .as_deref()
                .filter(|path| !path.is_empty())
                .map(|path| media.site_url(path)),
        }
    }
}

/// Product list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/list.html")]
pub struct ProductListTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/detail.html")]
pub struct ProductDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: ProductView,
}

/// Parse a product ID from a path segment.
///
/// Anything that is not a UUID cannot name a product, so it is a 404 rather
/// than a 400.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string()))
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string()))
}

/// Display every product.
#[instrument(skip(state, current_user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<ProductListTemplate> {
    let media = &state.config().media;
    let products = ProductRepository::new(state.pool())
        .list()
        .await?
        .iter()
        .map(|p| ProductView::new(p, media))
        .collect();

    Ok(ProductListTemplate {
        current_user,
        products,
    })
}

/// Display a single product.
#[instrument(skip(state, current_user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ProductDetailTemplate> {
    let product = find_product(&state, parse_product_id(&id)?).await?;

    Ok(ProductDetailTemplate {
        current_user,
        product: ProductView::new(&product, &state.config().media),
    })
}

/// Download every product as CSV.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn export_csv(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let products = ProductRepository::new(state.pool()).list().await?;
    tracing::info!(count = products.len(), "Exporting products");

    let body = export::products_csv(&products, &state.config().media);
    Ok(csv_response("products.csv", body))
}

/// Download one product as CSV.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn export_product_csv(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let product = find_product(&state, parse_product_id(&id)?).await?;

    let body = export::products_csv([&product], &state.config().media);
    Ok(csv_response(&format!("product-{}.csv", product.id), body))
}

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{
        TestApp, body_string, create_product, create_user, get_request,
    };

    #[test]
    fn test_parse_product_id_rejects_garbage_as_not_found() {
        assert!(matches!(
            parse_product_id("not-a-uuid"),
            Err(AppError::NotFound(msg)) if msg == messages::PRODUCT_NOT_FOUND
        ));
        assert!(parse_product_id("6f1c7a4e-9d8b-4c2a-8e3f-1a2b3c4d5e6f").is_ok());
    }

    #[test]
    fn test_csv_response_headers() {
        let response = csv_response("products.csv", "name\r\n".to_string());
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"products.csv\""
        );
    }

    #[tokio::test]
    async fn test_csv_export_requires_login() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/products/csv/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=%2Fproducts%2Fcsv%2F"
        );
    }

    #[tokio::test]
    async fn test_malformed_product_id_is_not_found() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/products/nope/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, messages::PRODUCT_NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_csv_export_has_a_row_per_product(pool: sqlx::PgPool) {
        let user = create_user(&pool, "export@example.com").await;
        create_product(&pool, "Mug", "MUG-1").await;
        create_product(&pool, "Towel", "TOWEL-1").await;
        create_product(&pool, "Tote", "TOTE-1").await;

        let app = TestApp::with_pool(pool);
        let cookie = app.login_as(user.id, false).await;
        let response = app
            .router()
            .oneshot(get_request("/products/csv/", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        let lines: Vec<&str> = body.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], export::CSV_HEADER.join(","));
        assert!(lines[1].starts_with("Mug,"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_single_csv_export(pool: sqlx::PgPool) {
        let user = create_user(&pool, "single@example.com").await;
        let mug = create_product(&pool, "Mug", "MUG-1").await;

        let app = TestApp::with_pool(pool);
        let cookie = app.login_as(user.id, false).await;

        let response = app
            .router()
            .oneshot(get_request(&format!("/products/{}/csv/", mug.id), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await.split_terminator("\r\n").count(), 2);

        let missing = ProductId::generate();
        let response = app
            .router()
            .oneshot(get_request(&format!("/products/{missing}/csv/"), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, messages::PRODUCT_NOT_FOUND);
    }
}
