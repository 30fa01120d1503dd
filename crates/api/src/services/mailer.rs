//! Outbound email delivery for one-time codes.
//!
//! Delivery is behind the [`Mailer`] trait so the auth flow does not care
//! whether codes go out over a real transactional-mail API or just into the
//! logs during development.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use luxe_scent_core::{Email, OtpCode};

use crate::config::MailConfig;

/// Errors that can occur when sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("mail API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Configuration value could not be used.
    #[error("mail config error: {0}")]
    Config(String),
}

/// Delivers one-time codes to users.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a login code to the given address.
    async fn send_code(&self, to: &Email, code: &OtpCode) -> Result<(), MailerError>;
}

/// Mailer over a JSON transactional-mail HTTP API.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    from_address: String,
}

impl HttpMailer {
    /// Create a mailer from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &MailConfig) -> Result<Self, MailerError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| MailerError::Config(format!("invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert("Authorization", auth_value);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_code(&self, to: &Email, code: &OtpCode) -> Result<(), MailerError> {
        let body = serde_json::json!({
            "from": self.from_address,
            "to": to.as_str(),
            "subject": "Your Luxe Scent verification code",
            "text": format!(
                "Your verification code is {}. It expires in 10 minutes.",
                code.as_str()
            ),
        });

        let response = self.client.post(&self.api_url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Mailer that writes codes to the log instead of sending anything. Used
/// when no mail API is configured (development, tests).
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, to: &Email, code: &OtpCode) -> Result<(), MailerError> {
        tracing::info!(email = %to, code = code.as_str(), "mail transport not configured, logging code");
        Ok(())
    }
}
