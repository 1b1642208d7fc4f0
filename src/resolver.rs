//! Bundle identifier to display name resolution.
//!
//! Notifications carry the source app's bundle identifier
//! (`com.apple.Messages`); the forwarded message should show the human name
//! (`Messages`). Spotlight knows the mapping, so the production resolver
//! shells out to `mdfind`. Resolution is best-effort: any failure yields an
//! empty string and the pipeline falls back to the raw identifier.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

/// Best-effort lookup from bundle identifier to human app name.
#[async_trait]
pub trait DisplayNameResolver: Send + Sync {
    /// Resolve `identifier` to a display name; empty string when unknown.
    async fn resolve(&self, identifier: &str) -> String;
}

/// Spotlight-backed resolver.
///
/// Runs `mdfind kMDItemCFBundleIdentifier = <id> -attr kMDItemDisplayName`
/// and takes the attribute value from the first matching line. Results are
/// memoized for the process lifetime; the mapping never changes while an app
/// is installed.
#[derive(Debug, Default)]
pub struct MdfindResolver {
    cache: Mutex<HashMap<String, String>>,
}

impl MdfindResolver {
    pub fn new() -> Self {
        Self::default()
    }

    async fn query_spotlight(identifier: &str) -> String {
        let output = tokio::process::Command::new("mdfind")
            .args([
                "kMDItemCFBundleIdentifier",
                "=",
                identifier,
                "-attr",
                "kMDItemDisplayName",
            ])
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                parse_mdfind_output(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                debug!(
                    identifier,
                    status = %output.status,
                    "mdfind lookup failed"
                );
                String::new()
            }
            Err(e) => {
                debug!(identifier, error = %e, "mdfind not available");
                String::new()
            }
        }
    }
}

#[async_trait]
impl DisplayNameResolver for MdfindResolver {
    async fn resolve(&self, identifier: &str) -> String {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return String::new();
        }

        if let Some(name) = self.cache.lock().unwrap().get(identifier) {
            return name.clone();
        }

        let name = Self::query_spotlight(identifier).await;
        self.cache
            .lock()
            .unwrap()
            .insert(identifier.to_string(), name.clone());
        name
    }
}

/// Extract the attribute value from `mdfind -attr` output.
///
/// Lines look like `/Applications/Messages.app   kMDItemDisplayName = Messages`;
/// the value follows the last ` = `. Spotlight prints `(null)` for apps
/// without a display name.
fn parse_mdfind_output(stdout: &str) -> String {
    let Some(line) = stdout.lines().next() else {
        return String::new();
    };
    let value = line.rsplit(" = ").next().unwrap_or("").trim();
    if value == "(null)" {
        String::new()
    } else {
        value.to_string()
    }
}

/// Resolver that never resolves anything. Used in tests and as a fallback
/// when Spotlight is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

#[async_trait]
impl DisplayNameResolver for NullResolver {
    async fn resolve(&self, _identifier: &str) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mdfind_output() {
        let stdout = "/Applications/Messages.app   kMDItemDisplayName = Messages\n";
        assert_eq!(parse_mdfind_output(stdout), "Messages");
    }

    #[test]
    fn test_parse_mdfind_output_null_attribute() {
        let stdout = "/Applications/Thing.app   kMDItemDisplayName = (null)\n";
        assert_eq!(parse_mdfind_output(stdout), "");
    }

    #[test]
    fn test_parse_mdfind_output_empty() {
        assert_eq!(parse_mdfind_output(""), "");
    }

    #[test]
    fn test_parse_mdfind_output_takes_first_match() {
        let stdout = "/Applications/A.app kMDItemDisplayName = First\n\
                      /Applications/B.app kMDItemDisplayName = Second\n";
        assert_eq!(parse_mdfind_output(stdout), "First");
    }

    #[tokio::test]
    async fn test_null_resolver() {
        let resolver = NullResolver;
        assert_eq!(resolver.resolve("com.apple.Messages").await, "");
    }
}
