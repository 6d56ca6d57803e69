//! Authentication route handlers.
//!
//! Handles login, registration and logout with email + password accounts
//! stored in `PostgreSQL`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::safe_next;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Where to go after logging in.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub email: String,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> LoginTemplate {
    LoginTemplate {
        current_user,
        error: None,
        email: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) if e.is_client_error() => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                current_user: None,
                error: Some(e.user_message().to_string()),
                email: form.email,
                next,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(current_user): OptionalAuth) -> RegisterTemplate {
    RegisterTemplate {
        current_user,
        error: None,
        email: String::new(),
    }
}

/// Handle registration form submission and log the new user in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = if form.password == form.password_confirm {
        AuthService::new(state.pool())
            .register_with_password(&form.email, &form.password, false)
            .await
    } else {
        Err(AuthError::PasswordMismatch)
    };

    match result {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User registered");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) if e.is_client_error() => {
            tracing::warn!(error = %e, "Registration rejected");
            Ok(RegisterTemplate {
                current_user: None,
                error: Some(e.user_message().to_string()),
                email: form.email,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// End the session.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use crate::routes::test_support::{TestApp, body_string, form_request, get_request};

    #[tokio::test]
    async fn test_login_page_keeps_local_next() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/auth/login/?next=%2Fcart%2F", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("value=\"/cart/\""));
    }

    #[tokio::test]
    async fn test_login_page_drops_backslash_next() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/auth/login/?next=%2F%5Cevil.test", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("name=\"next\" value=\"/\""));
        assert!(!body.contains("evil.test"));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let app = TestApp::new();
        let cookie = app.login(false).await;

        let response = app
            .router()
            .oneshot(form_request("/auth/logout/", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let response = app
            .router()
            .oneshot(get_request("/cart/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
