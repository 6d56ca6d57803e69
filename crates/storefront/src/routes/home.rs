//! Main page route handler.

use askama::Template;
use askama_web::WebTemplate;

use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// Main page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Display the main page.
pub async fn home(OptionalAuth(current_user): OptionalAuth) -> HomeTemplate {
    HomeTemplate { current_user }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::messages;
    use crate::routes::test_support::{TestApp, body_string, get_request};

    #[tokio::test]
    async fn test_main_page_greets_visitors() {
        let app = TestApp::new();
        let response = app.router().oneshot(get_request("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains(messages::WELCOME));
    }
}
