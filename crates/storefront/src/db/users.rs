//! User repository for database operations.

use sqlx::PgPool;

use shopfront_core::Email;

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, is_staff, is_active, date_joined";

/// Ordering applied to user listings.
///
/// Email is the only orderable field; `Unordered` leaves rows in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    #[default]
    Unordered,
    EmailAsc,
    EmailDesc,
}

impl UserSort {
    const fn order_clause(self) -> &'static str {
        match self {
            Self::Unordered => "",
            Self::EmailAsc => " ORDER BY email ASC",
            Self::EmailDesc => " ORDER BY email DESC",
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
        is_staff: bool,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO shop.users (email, password_hash, is_staff)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email)
        .bind(password_hash)
        .bind(is_staff)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email"))
    }

    /// Grant or revoke admin access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_staff(&self, email: &Email, is_staff: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.users SET is_staff = $2 WHERE email = $1")
            .bind(email)
            .bind(is_staff)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List all users in the requested order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, sort: UserSort) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users{}",
            sort.order_clause()
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_adds_no_order_clause() {
        assert_eq!(UserSort::default().order_clause(), "");
    }

    #[test]
    fn test_email_sort_clauses() {
        assert_eq!(UserSort::EmailAsc.order_clause(), " ORDER BY email ASC");
        assert_eq!(UserSort::EmailDesc.order_clause(), " ORDER BY email DESC");
    }
}
