//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account that can use /admin/
//! shopfront-cli user create -e admin@example.com -p 'long password' --staff
//!
//! # Grant or revoke staff access on an existing account
//! shopfront-cli user staff -e admin@example.com
//! shopfront-cli user staff -e admin@example.com --revoke
//! ```

use shopfront_core::Email;
use shopfront_storefront::db::UserRepository;
use shopfront_storefront::services::auth::{AuthError, AuthService};

use super::{CommandError, connect};

/// Create a new account.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the email is invalid, the password is too
/// weak or the email is already registered.
pub async fn create(email: &str, password: &str, is_staff: bool) -> Result<i32, CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating user: {} (staff: {})", email, is_staff);
    let user = AuthService::new(&pool)
        .register_with_password(email, password, is_staff)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id.as_i32())
}

/// Grant or revoke staff access.
///
/// # Errors
///
/// Returns `CommandError::Repository` with `NotFound` if no account uses
/// this email.
pub async fn set_staff(email: &str, is_staff: bool) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(AuthError::from)?.normalized();
    let pool = connect().await?;

    UserRepository::new(&pool).set_staff(&email, is_staff).await?;

    if is_staff {
        tracing::info!("{} can now use the admin", email);
    } else {
        tracing::info!("{} no longer has admin access", email);
    }
    Ok(())
}
