//! Contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::forms::{ContactForm, FormErrors};
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub current_user: Option<CurrentUser>,
    pub form: ContactForm,
    pub errors: FormErrors,
}

/// Display an empty contact form.
pub async fn contact_page(OptionalAuth(current_user): OptionalAuth) -> ContactTemplate {
    ContactTemplate {
        current_user,
        form: ContactForm::default(),
        errors: FormErrors::new(),
    }
}

/// Validate a submission and mail it to the shop.
///
/// Invalid input redisplays the form with the submitted values and field
/// errors; nothing is sent.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let contact = match form.validate() {
        Ok(contact) => contact,
        Err(errors) => {
            tracing::debug!(error_count = errors.len(), "Contact form rejected");
            return Ok(ContactTemplate {
                current_user,
                form,
                errors,
            }
            .into_response());
        }
    };

    state
        .email()
        .send_contact_message(contact.email.as_str(), &contact.text)
        .await?;

    tracing::info!(email = %contact.email, "Contact message sent");
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use crate::messages;
    use crate::routes::test_support::{TestApp, body_string, form_request, get_request};

    async fn post_contact(app: &TestApp, body: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .router()
            .oneshot(form_request("/contact-us/", body, None))
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        (status, location, body_string(response).await)
    }

    #[tokio::test]
    async fn test_contact_page_renders() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request("/contact-us/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains(messages::CONTACT_HEADING));
    }

    #[tokio::test]
    async fn test_empty_email_is_required() {
        let app = TestApp::new();
        let (status, _, body) = post_contact(&app, "email=&text=Hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches(messages::FIELD_REQUIRED).count(), 1);
        assert!(app.outbox.is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_required() {
        let app = TestApp::new();
        let (status, _, body) = post_contact(&app, "email=buyer%40example.com&text=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches(messages::FIELD_REQUIRED).count(), 1);
        // Submitted value is echoed back
        assert!(body.contains("buyer@example.com"));
        assert!(app.outbox.is_empty());
    }

    #[tokio::test]
    async fn test_both_empty_gives_two_errors() {
        let app = TestApp::new();
        let (status, _, body) = post_contact(&app, "email=&text=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches(messages::FIELD_REQUIRED).count(), 2);
        assert!(app.outbox.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let app = TestApp::new();
        let (status, _, body) = post_contact(&app, "email=not-an-email&text=Hi").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(messages::INVALID_EMAIL));
        assert!(!body.contains(messages::FIELD_REQUIRED));
        assert!(app.outbox.is_empty());
    }

    #[tokio::test]
    async fn test_email_with_header_special_characters_is_a_form_error() {
        let app = TestApp::new();
        for email in ["a%2Cb%40example.com", "a%3Cb%40example.com", "a%28b%40example.com"] {
            let (status, _, body) = post_contact(&app, &format!("email={email}&text=hi")).await;

            assert_eq!(status, StatusCode::OK, "{email}");
            assert!(body.contains(messages::INVALID_EMAIL), "{email}");
        }
        assert!(app.outbox.is_empty());
    }

    #[tokio::test]
    async fn test_valid_submission_sends_one_email_and_redirects_home() {
        let app = TestApp::new();
        let (status, location, _) = post_contact(
            &app,
            "email=buyer%40example.com&text=Do+you+ship+to+Oslo%3F",
        )
        .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let sent = app.outbox.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("buyer@example.com"));
        assert!(sent[0].body.contains("Do you ship to Oslo?"));
    }
}
