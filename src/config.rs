//! Runtime configuration.
//!
//! Built by the CLI layer, validated eagerly before anything opens the store
//! or sends a byte. Validation failures are fatal configuration errors.

use std::path::PathBuf;
use std::time::Duration;

use crate::providers::ProviderConfig;
use crate::{Error, Result};

/// Everything the forwarder needs to run.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Selected delivery provider with its credentials.
    pub provider: ProviderConfig,
    /// Poll period, measured from the end of one poll to the start of the
    /// next.
    pub period: Duration,
    /// Suppress the banner and all non-error output.
    pub silent: bool,
    /// Send one test notification before the scheduler starts.
    pub send_test_on_startup: bool,
    /// Explicit store path; `None` means discover the default location.
    pub database: Option<PathBuf>,
}

impl ForwarderConfig {
    /// Check the whole configuration, failing fast with a descriptive error.
    pub fn validate(&self) -> Result<()> {
        if self.period.is_zero() {
            return Err(Error::config("frequency must be a positive integer"));
        }
        self.provider.validate()
    }
}
