//! Delivery-ready notification values.
//!
//! Turns a decoded payload into the canonical form providers consume: display
//! name resolved, subtitle and body merged into one text line, age computed
//! in the store epoch.

use std::fmt;

use crate::payload::DecodedPayload;
use crate::resolver::DisplayNameResolver;
use crate::store::time;

/// Separator between subtitle and body in the merged text.
const MERGE_SEPARATOR: &str = " – ";

/// One notification, ready for delivery. Built once per new record, handed to
/// the dispatcher, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Raw bundle identifier of the source app.
    pub source_identifier: String,
    /// Human app name; empty when resolution failed.
    pub display_name: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    /// Subtitle and body joined with a separator; notifications have three
    /// content lines but providers take two.
    pub merged_text: String,
    /// Seconds between insertion and now, both in the store epoch.
    pub age_seconds: f64,
}

impl Notification {
    /// Name to present as the sending app: the display name when resolved,
    /// otherwise the raw identifier.
    pub fn app_label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.source_identifier
        } else {
            &self.display_name
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "notification from {} {} minutes ago: {} ({})",
            self.app_label(),
            (self.age_seconds / 60.0) as i64,
            self.title.trim(),
            self.merged_text.trim()
        )
    }
}

/// Build a [`Notification`] from a decoded payload.
///
/// `fallback_date` is the record's effective timestamp from the store row,
/// used when the payload itself carries no date. Display-name resolution is
/// best-effort and never fails the build.
pub async fn build(
    decoded: &DecodedPayload,
    fallback_date: f64,
    resolver: &dyn DisplayNameResolver,
) -> Notification {
    let source_identifier = decoded.app.clone().unwrap_or_default();
    let display_name = resolver.resolve(&source_identifier).await;

    let title = decoded.req.titl.clone().unwrap_or_default();
    let subtitle = decoded.req.subt.clone().unwrap_or_default();
    let body = decoded.req.body.clone().unwrap_or_default();
    let merged_text = merge_text(&subtitle, &body);

    let insertion_date = decoded.date.unwrap_or(fallback_date);
    let age_seconds = time::age_seconds(insertion_date);

    Notification {
        source_identifier,
        display_name,
        title,
        subtitle,
        body,
        merged_text,
        age_seconds,
    }
}

/// Merge subtitle and body into a single line. The separator appears only
/// when both are present; a single populated field passes through unchanged.
fn merge_text(subtitle: &str, body: &str) -> String {
    match (subtitle.is_empty(), body.is_empty()) {
        (false, false) => format!("{subtitle}{MERGE_SEPARATOR}{body}"),
        (false, true) => subtitle.to_string(),
        _ => body.to_string(),
    }
}
