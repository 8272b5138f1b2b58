//! HTTP client for the notification endpoint.
//!
//! The endpoint accepts `POST {base}/notify-user` with a JSON
//! [`Notification`] and sends the email. Any non-2xx answer is a failed
//! attempt; retries are the outbound queue's job.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ControlError, Result};
use crate::messages::Notification;

/// Trait for sending user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint rejects it.
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// HTTP client for the notification endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    /// Create a notifier for the endpoint at `base_url` (e.g. `http://mailer:8080`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(client, base_url)
    }

    /// Create a notifier with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL of the notification endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let url = format!("{}/notify-user", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(notification)
            .send()
            .await
            .map_err(|e| ControlError::Outbound(format!("notify request failed: {e}")))?;

        if response.status().is_success() {
            tracing::debug!(email = %notification.email, "Sent notification");
            return Ok(());
        }

        let status = response.status();
        let error = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("notification endpoint returned status {status}"));

        tracing::error!(
            email = %notification.email,
            status = %status,
            error = %error,
            "Failed to send notification"
        );

        Err(ControlError::Outbound(error))
    }
}

/// A notifier that only logs, for deployments without an email endpoint.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::warn!(
            email = %notification.email,
            subject = %notification.subject,
            "NoopNotifier: notification dropped, no endpoint configured"
        );
        Ok(())
    }
}
