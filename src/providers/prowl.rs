//! Prowl delivery provider.
//!
//! Sends via the Prowl public API (`POST /publicapi/add`) as a form post with
//! a single API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderResponse, PushProvider, SEND_TIMEOUT};
use crate::{Error, Result};

const PROWL_API_URL: &str = "https://api.prowlapp.com/publicapi/add";

/// Prowl provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProwlConfig {
    /// Prowl API key.
    pub api_key: String,
}

impl ProwlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(
                "Prowl API key missing. Is $PROWL_API_KEY defined?",
            ));
        }
        Ok(())
    }
}

/// Prowl delivery provider.
pub struct ProwlProvider {
    config: ProwlConfig,
    client: Client,
}

impl ProwlProvider {
    /// Create a new Prowl provider. Credentials are validated by the caller
    /// via [`ProwlConfig::validate`] before construction.
    pub fn new(config: ProwlConfig) -> Self {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Build the form fields for one send.
    fn build_form(&self, app: &str, title: &str, text: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.config.api_key.clone()),
            ("application", app.to_string()),
            ("event", title.to_string()),
            ("description", text.to_string()),
        ]
    }
}

#[async_trait]
impl PushProvider for ProwlProvider {
    fn name(&self) -> &'static str {
        "prowl"
    }

    async fn send_notification(
        &self,
        app: &str,
        title: &str,
        text: &str,
    ) -> Result<ProviderResponse> {
        let form = self.build_form(app, title, text);

        let response = self.client.post(PROWL_API_URL).form(&form).send().await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.unwrap_or_default();

        debug!(status = status.as_u16(), "Prowl send completed");

        Ok(ProviderResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
