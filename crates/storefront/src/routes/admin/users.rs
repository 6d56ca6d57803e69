//! Admin user list.
//!
//! Shows only the email column. Rows come back in storage order unless the
//! request sorts by email.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::components::data_table::{
    DataTableConfig, SortDirection, SortOrder, users_table_config,
};
use crate::db::{UserRepository, UserSort};
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// Query parameters for the user list.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub sort: Option<String>,
}

/// User list page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub current_user: Option<CurrentUser>,
    pub table: DataTableConfig,
    pub sort: Option<SortOrder>,
    pub users: Vec<User>,
}

impl UsersTemplate {
    /// `sort` value for a header link.
    #[must_use]
    pub fn sort_link(&self, key: &str) -> String {
        DataTableConfig::sort_link(key, self.sort.as_ref())
    }
}

/// Map a validated table sort onto the repository ordering.
#[must_use]
pub fn user_sort(order: Option<&SortOrder>) -> UserSort {
    match order {
        Some(o) if o.column == "email" => match o.direction {
            SortDirection::Ascending => UserSort::EmailAsc,
            SortDirection::Descending => UserSort::EmailDesc,
        },
        _ => UserSort::Unordered,
    }
}

/// Display the user list.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<UsersQuery>,
) -> Result<UsersTemplate> {
    let table = users_table_config();
    let sort = table.resolve_sort(query.sort.as_deref());
    let users = UserRepository::new(state.pool())
        .list(user_sort(sort.as_ref()))
        .await?;

    Ok(UsersTemplate {
        current_user: Some(staff),
        table,
        sort,
        users,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;
    use axum::http::StatusCode;
    use chrono::Utc;
    use tower::ServiceExt;

    use shopfront_core::{Email, UserId};

    use super::*;
    use crate::routes::test_support::{TestApp, get_request};

    fn user(id: i32, email: &str) -> User {
        User {
            id: UserId::new(id),
            email: Email::parse(email).unwrap(),
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_user_sort_mapping() {
        let table = users_table_config();
        assert_eq!(
            user_sort(table.resolve_sort(Some("email")).as_ref()),
            UserSort::EmailAsc
        );
        assert_eq!(
            user_sort(table.resolve_sort(Some("-email")).as_ref()),
            UserSort::EmailDesc
        );
        assert_eq!(
            user_sort(table.resolve_sort(Some("is_staff")).as_ref()),
            UserSort::Unordered
        );
        assert_eq!(user_sort(None), UserSort::Unordered);
    }

    #[test]
    fn test_user_list_renders_only_email_column() {
        let html = UsersTemplate {
            current_user: None,
            table: users_table_config(),
            sort: None,
            users: vec![user(1, "zoe@example.com"), user(2, "adam@example.com")],
        }
        .render()
        .unwrap();

        assert!(html.contains("zoe@example.com"));
        assert!(html.contains("adam@example.com"));
        assert_eq!(html.matches("<th scope=\"col\"").count(), 1);
        assert!(html.contains("?sort=email"));
        assert!(!html.contains("date_joined"));
        // Rows keep the order they were given in
        assert!(html.find("zoe@").unwrap() < html.find("adam@").unwrap());
    }

    #[tokio::test]
    async fn test_non_staff_is_forbidden() {
        let app = TestApp::new();
        let cookie = app.login(false).await;

        let response = app
            .router()
            .oneshot(get_request("/admin/users/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/admin/users/?sort=email", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
