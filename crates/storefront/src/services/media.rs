//! Storage for uploaded product images.
//!
//! Files are written below the media root as `products/<product-id>-<name>`
//! and the database keeps only that relative path. An existing file is never
//! replaced: a taken name gets a `_<suffix>` before its extension.

use std::path::Path;

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use shopfront_core::ProductId;

use crate::config::MediaConfig;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Attempts at finding a free name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Errors that can occur while storing media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file extension is not an accepted image type.
    #[error("Upload a valid image. Accepted formats: jpg, jpeg, png, gif, webp.")]
    UnsupportedType,

    /// The upload exceeds [`MAX_IMAGE_BYTES`].
    #[error("The image is larger than 5 MB.")]
    TooLarge,

    /// Writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Whether the error was caused by the upload itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedType | Self::TooLarge)
    }
}

/// Check an upload before anything touches the disk.
///
/// # Errors
///
/// Returns `MediaError::UnsupportedType` or `MediaError::TooLarge`.
pub fn validate_image(file_name: &str, len: usize) -> Result<(), MediaError> {
    if len > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge);
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(MediaError::UnsupportedType)?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(MediaError::UnsupportedType);
    }
    Ok(())
}

/// Write a product image and return its path relative to the media root.
///
/// # Errors
///
/// Returns a validation error for bad uploads or `MediaError::Io` if the
/// file cannot be written.
pub async fn store_product_image(
    media: &MediaConfig,
    product_id: ProductId,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, MediaError> {
    validate_image(file_name, bytes.len())?;

    let name = sanitize_file_name(file_name);
    tokio::fs::create_dir_all(media.root.join("products")).await?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let relative = if attempt == 0 {
            format!("products/{product_id}-{name}")
        } else {
            format!("products/{product_id}-{}", with_suffix(&name))
        };

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(media.root.join(&relative))
            .await;

        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::info!(path = %relative, size = bytes.len(), "Stored product image");
        return Ok(relative);
    }

    Err(MediaError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for {name}"),
    )))
}

/// `mug.png` becomes `mug_<7 random characters>.png`.
fn with_suffix(name: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(7)
        .collect();

    match name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}_{suffix}.{extension}"),
        None => format!("{name}_{suffix}"),
    }
}

/// Remove a stored image, ignoring files that are already gone.
///
/// # Errors
///
/// Returns `MediaError::Io` for failures other than a missing file.
pub async fn delete_media(media: &MediaConfig, relative_path: &str) -> Result<(), MediaError> {
    if relative_path.contains("..") {
        tracing::warn!(path = %relative_path, "Refusing to delete media outside the root");
        return Ok(());
    }
    match tokio::fs::remove_file(media.root.join(relative_path)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Reduce an uploaded file name to a safe single path component.
fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}
