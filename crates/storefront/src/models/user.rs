//! User domain types.

use chrono::{DateTime, Utc};

use shopfront_core::{Email, UserId};

/// A site account.
///
/// The email is the identifying, displayed and sortable field.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Staff users can reach the admin.
    pub is_staff: bool,
    /// Inactive users cannot log in.
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}
