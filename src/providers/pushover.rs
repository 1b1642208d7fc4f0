//! Pushover delivery provider.
//!
//! Sends via the Pushover message API (`POST /1/messages.json`) as a form
//! post. Pushover needs two credentials: the application token and the user
//! (or group) key.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderResponse, PushProvider, SEND_TIMEOUT};
use crate::{Error, Result};

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushoverConfig {
    /// Pushover application token.
    pub api_key: String,
    /// Pushover user or group key.
    pub user_key: String,
}

impl PushoverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(
                "Pushover API token missing. Is $PUSHOVER_API_KEY defined?",
            ));
        }
        if self.user_key.trim().is_empty() {
            return Err(Error::config(
                "Pushover user key missing. Is $PUSHOVER_USER_KEY defined?",
            ));
        }
        Ok(())
    }
}

/// Pushover delivery provider.
pub struct PushoverProvider {
    config: PushoverConfig,
    client: Client,
}

impl PushoverProvider {
    /// Create a new Pushover provider. Credentials are validated by the
    /// caller via [`PushoverConfig::validate`] before construction.
    pub fn new(config: PushoverConfig) -> Self {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Build the form fields for one send.
    ///
    /// Pushover has no separate application field, so the app name is folded
    /// into the title.
    fn build_form(&self, app: &str, title: &str, text: &str) -> Vec<(&'static str, String)> {
        vec![
            ("token", self.config.api_key.clone()),
            ("user", self.config.user_key.clone()),
            ("title", build_title(app, title)),
            ("message", text.to_string()),
        ]
    }
}

#[async_trait]
impl PushProvider for PushoverProvider {
    fn name(&self) -> &'static str {
        "pushover"
    }

    async fn send_notification(
        &self,
        app: &str,
        title: &str,
        text: &str,
    ) -> Result<ProviderResponse> {
        let form = self.build_form(app, title, text);

        let response = self
            .client
            .post(PUSHOVER_API_URL)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.unwrap_or_default();

        debug!(status = status.as_u16(), "Pushover send completed");

        Ok(ProviderResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

/// Fold the app name into the title line.
fn build_title(app: &str, title: &str) -> String {
    if title.is_empty() {
        app.to_string()
    } else {
        format!("{app}: {title}")
    }
}
