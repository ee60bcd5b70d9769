//! Transactional email: a small client for the Resend HTTP API and the
//! order notification templates.

pub mod templates;

use std::{sync::Arc, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailConfig;

pub use templates::{OrderEmail, render_order_email};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email provider error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Clone)]
pub struct EmailClient {
    inner: Arc<EmailClientInner>,
}

struct EmailClientInner {
    client: reqwest::Client,
    api_key: SecretString,
    from_address: String,
}

impl EmailClient {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            inner: Arc::new(EmailClientInner {
                client,
                api_key: config.api_key.clone(),
                from_address: config.from_address.clone(),
            }),
        })
    }

    /// Send one HTML email and return the provider's message id.
    #[instrument(skip(self, html), fields(to = %to, subject = %subject))]
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, EmailError> {
        let response = self
            .inner
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.inner.api_key.expose_secret())
            .json(&SendRequest {
                from: &self.inner.from_address,
                to: [to],
                subject,
                html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SendResponse = response.json().await?;
        tracing::info!(id = %body.id, "email sent");
        Ok(body.id)
    }
}
