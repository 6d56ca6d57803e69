//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DOMAIN` - Domain prefixed to exported image paths (default: base URL)
//! - `STOREFRONT_MEDIA_URL` - URL prefix for uploaded media (default: /media/)
//! - `STOREFRONT_MEDIA_ROOT` - Directory uploaded media is stored in (default: media)
//! - `CONTACT_RECIPIENT` - Address contact form messages are delivered to
//! - `EMAIL_FROM` - Sender address for outgoing mail
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD` - SMTP relay;
//!   when `SMTP_HOST` is unset mail is kept in an in-memory outbox
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Where uploaded product images live and how they are addressed
    pub media: MediaConfig,
    /// Outgoing mail configuration
    pub email: EmailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Media (uploaded image) configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Scheme and host prefixed to media paths in exports, without trailing slash
    pub domain: String,
    /// URL path prefix media is served under, with leading and trailing slash
    pub url: String,
    /// Filesystem directory uploads are written to
    pub root: PathBuf,
}

impl MediaConfig {
    /// Absolute URL for a stored relative media path.
    ///
    /// ```
    /// # use shopfront_storefront::config::MediaConfig;
    /// let media = MediaConfig {
    ///     domain: "https://shop.test".to_string(),
    ///     url: "/media/".to_string(),
    ///     root: "media".into(),
    /// };
    /// assert_eq!(
    ///     media.absolute_url("products/mug.jpg"),
    ///     "https://shop.test/media/products/mug.jpg"
    /// );
    /// ```
    #[must_use]
    pub fn absolute_url(&self, relative_path: &str) -> String {
        format!("{}{}", self.domain, self.site_url(relative_path))
    }

    /// Site-relative URL for a stored relative media path.
    #[must_use]
    pub fn site_url(&self, relative_path: &str) -> String {
        format!("{}{}", self.url, relative_path.trim_start_matches('/'))
    }
}

/// Outgoing mail configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Address contact form submissions are delivered to
    pub contact_recipient: String,
    /// `From` header for outgoing mail
    pub from_address: String,
    /// SMTP relay; `None` keeps messages in the in-memory outbox
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_port("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let media = MediaConfig::from_env(&base_url)?;
        let email = EmailConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            media,
            email,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls `Secure` cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl MediaConfig {
    fn from_env(base_url: &str) -> Result<Self, ConfigError> {
        let domain = get_env_or_default("STOREFRONT_DOMAIN", base_url)
            .trim_end_matches('/')
            .to_string();
        let url = normalize_url_prefix(&get_env_or_default("STOREFRONT_MEDIA_URL", "/media/"));
        if url == "/" {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_MEDIA_URL".to_string(),
                "media must not be served from the site root".to_string(),
            ));
        }

        Ok(Self {
            domain,
            url,
            root: PathBuf::from(get_env_or_default("STOREFRONT_MEDIA_ROOT", "media")),
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let smtp = match get_optional_env("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_port("SMTP_PORT", "587")?,
                username: get_required_env("SMTP_USERNAME")?,
                password: get_required_secret("SMTP_PASSWORD")?,
            }),
            None => None,
        };

        Ok(Self {
            contact_recipient: get_env_or_default("CONTACT_RECIPIENT", "hello@shopfront.local"),
            from_address: get_env_or_default("EMAIL_FROM", "Shopfront <noreply@shopfront.local>"),
            smtp,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_port(key: &str, default: &str) -> Result<u16, ConfigError> {
    get_env_or_default(key, default)
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Ensure a URL path prefix has exactly one leading and one trailing slash.
fn normalize_url_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_prefix() {
        assert_eq!(normalize_url_prefix("media"), "/media/");
        assert_eq!(normalize_url_prefix("/media"), "/media/");
        assert_eq!(normalize_url_prefix("/uploads/img/"), "/uploads/img/");
        assert_eq!(normalize_url_prefix(""), "/");
    }

    #[test]
    fn test_media_urls() {
        let media = MediaConfig {
            domain: "http://localhost:3000".to_string(),
            url: "/media/".to_string(),
            root: PathBuf::from("media"),
        };
        assert_eq!(media.site_url("/products/a.jpg"), "/media/products/a.jpg");
        assert_eq!(
            media.absolute_url("products/a.jpg"),
            "http://localhost:3000/media/products/a.jpg"
        );
    }

    #[test]
    fn test_smtp_config_debug_redacts_password() {
        let config = SmtpConfig {
            host: "smtp.mailhost.test".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: SecretString::from("super_secret_smtp_password"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.mailhost.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }
}
