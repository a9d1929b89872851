//! HTTP client for the LINE Messaging API reply endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::LineError;
use crate::types::{OutgoingMessage, ReplyRequest};

const DEFAULT_BASE_URL: &str = "https://api.line.me/";

/// Sends replies with a channel access token.
///
/// Use [`LineClient::new`] for production or [`LineClient::with_base_url`] to
/// point at a mock server in tests.
#[derive(Clone)]
pub struct LineClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl std::fmt::Debug for LineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineClient")
            .field("access_token", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl LineClient {
    /// # Errors
    ///
    /// Returns [`LineError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LineError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`LineError::Http`] if the HTTP client cannot be built, or
    /// [`LineError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, LineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LineError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Answers an event through its one-shot reply token.
    ///
    /// # Errors
    ///
    /// - [`LineError::Http`] on network failure.
    /// - [`LineError::UnexpectedStatus`] when LINE rejects the request, for
    ///   example an expired reply token.
    pub async fn reply(
        &self,
        reply_token: &str,
        messages: &[OutgoingMessage],
    ) -> Result<(), LineError> {
        let url = self
            .base_url
            .join("v2/bot/message/reply")
            .map_err(|e| LineError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&ReplyRequest {
                reply_token,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LineError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(messages = messages.len(), "sent LINE reply");
        Ok(())
    }
}
