//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::ForwarderConfig;
use crate::providers::{ProviderConfig, ProwlConfig, PushoverConfig};
use crate::{Error, Result};

/// Which delivery backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Prowl,
    Pushover,
}

/// macOS notification forwarder.
#[derive(Debug, Parser)]
#[command(
    name = "notifwd",
    version,
    about = "Forwards macOS Notification Center notifications to push services"
)]
pub struct Args {
    /// Delivery provider.
    #[arg(long, value_enum, default_value_t = ProviderKind::Prowl)]
    pub provider: ProviderKind,

    /// Provider API key. Falls back to $PROWL_API_KEY or $PUSHOVER_API_KEY
    /// depending on the provider.
    #[arg(long, short = 'k')]
    pub api_key: Option<String>,

    /// Pushover user key (pushover only).
    #[arg(long, short = 'u', env = "PUSHOVER_USER_KEY")]
    pub user_key: Option<String>,

    /// Frequency, in seconds, to check for new notifications.
    #[arg(long, short = 'f', default_value_t = 60, allow_negative_numbers = true)]
    pub frequency: i64,

    /// Suppress the banner and all non-error output.
    #[arg(long, short = 's')]
    pub silent: bool,

    /// Send a test notification on startup.
    #[arg(long)]
    pub test: bool,

    /// Path to the notification store database. Defaults to the current
    /// user's Notification Center store.
    #[arg(long)]
    pub database: Option<PathBuf>,
}

impl Args {
    /// Build the validated runtime configuration.
    pub fn into_config(self) -> Result<ForwarderConfig> {
        if self.frequency <= 0 {
            return Err(Error::config("frequency must be a positive integer"));
        }

        let provider = match self.provider {
            ProviderKind::Prowl => ProviderConfig::Prowl(ProwlConfig {
                api_key: self.api_key.or_else(|| env_var("PROWL_API_KEY")).unwrap_or_default(),
            }),
            ProviderKind::Pushover => ProviderConfig::Pushover(PushoverConfig {
                api_key: self
                    .api_key
                    .or_else(|| env_var("PUSHOVER_API_KEY"))
                    .unwrap_or_default(),
                user_key: self.user_key.unwrap_or_default(),
            }),
        };

        let config = ForwarderConfig {
            provider,
            period: Duration::from_secs(self.frequency as u64),
            silent: self.silent,
            send_test_on_startup: self.test,
            database: self.database,
        };
        config.validate()?;
        Ok(config)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("notifwd").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-k", "key"]);
        assert_eq!(args.provider, ProviderKind::Prowl);
        assert_eq!(args.frequency, 60);
        assert!(!args.silent);
        assert!(!args.test);
    }

    #[test]
    fn test_prowl_config_from_flag() {
        let config = parse(&["-k", "key"]).into_config().unwrap();
        assert_eq!(config.provider.provider_type(), "prowl");
        assert_eq!(config.period, Duration::from_secs(60));
    }

    #[test]
    fn test_pushover_requires_user_key() {
        let args = parse(&["--provider", "pushover", "-k", "token"]);
        let result = Args {
            user_key: None,
            ..args
        }
        .into_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_pushover_with_both_keys() {
        let config = parse(&["--provider", "pushover", "-k", "token", "-u", "user"])
            .into_config()
            .unwrap();
        assert_eq!(config.provider.provider_type(), "pushover");
    }

    #[test]
    fn test_nonpositive_frequency_rejected() {
        let result = parse(&["-k", "key", "-f", "0"]).into_config();
        assert!(result.is_err());

        let result = parse(&["-k", "key", "-f", "-5"]).into_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_silent_and_test_flags() {
        let config = parse(&["-k", "key", "-s", "--test"]).into_config().unwrap();
        assert!(config.silent);
        assert!(config.send_test_on_startup);
    }
}
