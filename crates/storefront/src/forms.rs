//! HTML form handling: field-scoped errors and the contact form.

use std::collections::BTreeMap;

use serde::Deserialize;

use shopfront_core::Email;

use crate::messages;

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Errors for one field, empty if it validated.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of error messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}

/// Trimmed value of a required field, recording an error when blank.
pub fn required<'a>(errors: &mut FormErrors, field: &'static str, value: &'a str) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, messages::FIELD_REQUIRED);
        None
    } else {
        Some(value)
    }
}

/// Raw contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub text: String,
}

/// A contact submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub email: Email,
    pub text: String,
}

impl ContactForm {
    /// Validate both fields, collecting every error.
    ///
    /// # Errors
    ///
    /// Returns the field errors when either field is blank or the email is
    /// not a valid address.
    pub fn validate(&self) -> Result<ValidContact, FormErrors> {
        let mut errors = FormErrors::new();

        let email = required(&mut errors, "email", &self.email).and_then(|raw| {
            Email::parse(raw)
                .map_err(|_| errors.add("email", messages::INVALID_EMAIL))
                .ok()
        });
        let text = required(&mut errors, "text", &self.text);

        match (email, text) {
            (Some(email), Some(_)) if errors.is_empty() => Ok(ValidContact {
                email,
                text: self.text.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, text: &str) -> ContactForm {
        ContactForm {
            email: email.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_valid_contact() {
        let valid = form(" buyer@example.com ", "Hello there").validate().unwrap();
        assert_eq!(valid.email.as_str(), "buyer@example.com");
        assert_eq!(valid.text, "Hello there");
    }

    #[test]
    fn test_blank_fields_are_required() {
        let errors = form("", "   ").validate().unwrap_err();
        assert_eq!(errors.get("email"), [messages::FIELD_REQUIRED]);
        assert_eq!(errors.get("text"), [messages::FIELD_REQUIRED]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_invalid_email() {
        let errors = form("not-an-email", "Hi").validate().unwrap_err();
        assert_eq!(errors.get("email"), [messages::INVALID_EMAIL]);
        assert!(!errors.has("text"));
    }

    #[test]
    fn test_email_with_header_special_characters_is_invalid() {
        for email in ["a,b@example.com", "a<b@example.com", "a(b@example.com"] {
            let errors = form(email, "Hi").validate().unwrap_err();
            assert_eq!(errors.get("email"), [messages::INVALID_EMAIL], "{email}");
        }
    }
}
