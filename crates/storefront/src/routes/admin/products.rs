//! Admin product management: list, create, edit and delete.
//!
//! Create and edit forms are `multipart/form-data` so an image can be
//! uploaded alongside the text fields.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use shopfront_core::{Price, ProductId};

use crate::components::data_table::{DataTableConfig, products_table_config};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::forms::{FormErrors, required};
use crate::messages;
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Product, ProductInput};
use crate::routes::products::{ProductView, parse_product_id};
use crate::services::media;
use crate::state::AppState;

/// Raw text values of the product form, echoed back on errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub sku: String,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            sku: product.sku.clone(),
        }
    }
}

/// An uploaded image, not yet written to disk.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Everything a product form submission carries.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub values: ProductFormValues,
    pub image: Option<Upload>,
    pub clear_image: bool,
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/list.html")]
pub struct ProductListTemplate {
    pub current_user: Option<CurrentUser>,
    pub table: DataTableConfig,
    pub products: Vec<ProductView>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub title: String,
    pub action: String,
    pub values: ProductFormValues,
    pub image_url: Option<String>,
    pub errors: FormErrors,
}

// =============================================================================
// Validation
// =============================================================================

/// Read the multipart body into a submission.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the body is not valid multipart data.
pub async fn read_submission(mut multipart: Multipart) -> Result<ProductSubmission> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part when no file was chosen
            if !file_name.is_empty() && !bytes.is_empty() {
                submission.image = Some(Upload { file_name, bytes });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let values = &mut submission.values;
        match name.as_str() {
            "name" => values.name = value,
            "description" => values.description = value,
            "category" => values.category = value,
            "price" => values.price = value,
            "sku" => values.sku = value,
            "clear_image" => submission.clear_image = !value.is_empty(),
            _ => {}
        }
    }

    Ok(submission)
}

/// Validate the text fields and the upload, without touching the database.
///
/// The returned input carries no image; the caller decides what it becomes.
///
/// # Errors
///
/// Returns every field error found.
pub fn validate_submission(
    submission: &ProductSubmission,
) -> std::result::Result<ProductInput, FormErrors> {
    let mut errors = FormErrors::new();
    let values = &submission.values;

    let name = required(&mut errors, "name", &values.name);
    let category = required(&mut errors, "category", &values.category);
    let sku = required(&mut errors, "sku", &values.sku);
    let price = required(&mut errors, "price", &values.price).and_then(|raw| {
        raw.parse::<Price>()
            .map_err(|_| errors.add("price", messages::INVALID_PRICE))
            .ok()
    });

    if let Some(upload) = &submission.image
        && let Err(e) = media::validate_image(&upload.file_name, upload.bytes.len())
    {
        errors.add("image", e.to_string());
    }

    match (name, category, sku, price) {
        (Some(name), Some(category), Some(sku), Some(price)) if errors.is_empty() => {
            Ok(ProductInput {
                name: name.to_string(),
                description: values.description.trim().to_string(),
                category: category.to_string(),
                price,
                sku: sku.to_string(),
                image: None,
            })
        }
        _ => Err(errors),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display every product.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<ProductListTemplate> {
    let media = &state.config().media;
    let products = ProductRepository::new(state.pool())
        .list()
        .await?
        .iter()
        .map(|p| ProductView::new(p, media))
        .collect();

    Ok(ProductListTemplate {
        current_user: Some(staff),
        table: products_table_config(),
        products,
    })
}

/// Display an empty product form.
pub async fn new_page(RequireStaff(staff): RequireStaff) -> ProductFormTemplate {
    ProductFormTemplate {
        current_user: Some(staff),
        title: "Add product".to_string(),
        action: "/admin/products/new/".to_string(),
        values: ProductFormValues::default(),
        image_url: None,
        errors: FormErrors::new(),
    }
}

/// Create a product.
#[instrument(skip_all, fields(staff_id = %staff.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(multipart).await?;
    let repo = ProductRepository::new(state.pool());

    let rerender = |errors: FormErrors, values: ProductFormValues| {
        ProductFormTemplate {
            current_user: Some(staff.clone()),
            title: "Add product".to_string(),
            action: "/admin/products/new/".to_string(),
            values,
            image_url: None,
            errors,
        }
        .into_response()
    };

    let mut input = match validate_submission(&submission) {
        Ok(input) => input,
        Err(errors) => return Ok(rerender(errors, submission.values)),
    };
    if repo.sku_taken(&input.sku, None).await? {
        return Ok(rerender(duplicate_sku(), submission.values));
    }

    let id = ProductId::generate();
    if let Some(upload) = &submission.image {
        input.image = Some(store_image(&state, id, upload).await?);
    }

    match repo.create_with_id(id, &input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
            Ok(Redirect::to("/admin/products/").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            discard_image(&state, input.image.as_deref()).await;
            Ok(rerender(duplicate_sku(), submission.values))
        }
        Err(e) => {
            discard_image(&state, input.image.as_deref()).await;
            Err(e.into())
        }
    }
}

/// Display the edit form for a product.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate> {
    let product = find_product(&state, &id).await?;
    let media = &state.config().media;

    Ok(ProductFormTemplate {
        current_user: Some(staff),
        title: format!("Edit {}", product.name),
        action: format!("/admin/products/{}/edit/", product.id),
        values: ProductFormValues::from(&product),
        image_url: product.image.as_deref().map(|path| media.site_url(path)),
        errors: FormErrors::new(),
    })
}

/// Update a product, replacing or clearing its image if asked to.
#[instrument(skip_all, fields(staff_id = %staff.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let existing = find_product(&state, &id).await?;
    let submission = read_submission(multipart).await?;
    let repo = ProductRepository::new(state.pool());

    let media = &state.config().media;
    let rerender = |errors: FormErrors, values: ProductFormValues| {
        ProductFormTemplate {
            current_user: Some(staff.clone()),
            title: format!("Edit {}", existing.name),
            action: format!("/admin/products/{}/edit/", existing.id),
            values,
            image_url: existing.image.as_deref().map(|path| media.site_url(path)),
            errors,
        }
        .into_response()
    };

    let mut input = match validate_submission(&submission) {
        Ok(input) => input,
        Err(errors) => return Ok(rerender(errors, submission.values)),
    };
    if repo.sku_taken(&input.sku, Some(existing.id)).await? {
        return Ok(rerender(duplicate_sku(), submission.values));
    }

    input.image = match &submission.image {
        Some(upload) => Some(store_image(&state, existing.id, upload).await?),
        None if submission.clear_image => None,
        None => existing.image.clone(),
    };

    match repo.update(existing.id, &input).await {
        Ok(product) => {
            if existing.image.is_some() && existing.image != product.image {
                discard_image(&state, existing.image.as_deref()).await;
            }
            tracing::info!(product_id = %product.id, "Product updated");
            Ok(Redirect::to("/admin/products/").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            if input.image != existing.image {
                discard_image(&state, input.image.as_deref()).await;
            }
            Ok(rerender(duplicate_sku(), submission.values))
        }
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product and its image.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let product = find_product(&state, &id).await?;

    if ProductRepository::new(state.pool()).delete(product.id).await? {
        discard_image(&state, product.image.as_deref()).await;
        tracing::info!(product_id = %product.id, "Product deleted");
    }
    Ok(Redirect::to("/admin/products/"))
}

// =============================================================================
// Helpers
// =============================================================================

async fn find_product(state: &AppState, raw_id: &str) -> Result<Product> {
    let id = parse_product_id(raw_id)?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string()))
}

fn duplicate_sku() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("sku", messages::DUPLICATE_SKU);
    errors
}

async fn store_image(state: &AppState, id: ProductId, upload: &Upload) -> Result<String> {
    Ok(media::store_product_image(
        &state.config().media,
        id,
        &upload.file_name,
        &upload.bytes,
    )
    .await?)
}

async fn discard_image(state: &AppState, path: Option<&str>) {
    let Some(path) = path else { return };
    if let Err(e) = media::delete_media(&state.config().media, path).await {
        tracing::warn!(path = %path, error = %e, "Failed to remove product image");
    }
}
