//! Push-notification delivery providers.
//!
//! This module provides the delivery backends a forwarded notification can be
//! sent through:
//! - Prowl (single API key)
//! - Pushover (API token + user key)

mod prowl;
mod pushover;

pub use prowl::{ProwlConfig, ProwlProvider};
pub use pushover::{PushoverConfig, PushoverProvider};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Per-request timeout for provider sends. The poll loop awaits sends
/// inline, so an unbounded request would stall the whole process.
pub(crate) const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP-level result of one send.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
    /// Response body text.
    pub body: String,
}

impl ProviderResponse {
    /// Providers signal acceptance with exactly 200.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Trait for push delivery providers.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Get the provider type name.
    fn name(&self) -> &'static str;

    /// Send one notification: sending app, title line, and message text.
    async fn send_notification(&self, app: &str, title: &str, text: &str)
    -> Result<ProviderResponse>;

    /// Send a fixed self-describing message to verify the configuration.
    async fn send_test(&self) -> Result<ProviderResponse> {
        self.send_notification(
            "notifwd",
            "Test notification",
            "notifwd is configured and forwarding notifications.",
        )
        .await
    }
}

/// Provider configuration wrapper.
///
/// A closed set: adding a backend means adding a variant, each carrying its
/// own credentials and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Prowl(ProwlConfig),
    Pushover(PushoverConfig),
}

impl ProviderConfig {
    /// Get the provider type name.
    pub fn provider_type(&self) -> &'static str {
        match self {
            Self::Prowl(_) => "prowl",
            Self::Pushover(_) => "pushover",
        }
    }

    /// Check the variant's required credentials, failing with a descriptive
    /// configuration error. Called eagerly at startup, before the scheduler.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Prowl(c) => c.validate(),
            Self::Pushover(c) => c.validate(),
        }
    }

    /// Validate and construct the provider for this configuration.
    pub fn create_provider(&self) -> Result<Box<dyn PushProvider>> {
        self.validate()?;
        Ok(match self {
            Self::Prowl(c) => Box::new(ProwlProvider::new(c.clone())),
            Self::Pushover(c) => Box::new(PushoverProvider::new(c.clone())),
        })
    }
}
