//! Delivery dispatch and outcome classification.
//!
//! One send per notification, no retries. A rejected or failed send is logged
//! and the poll continues; the cursor still advances past the record.

use tracing::{info, warn};

use crate::builder::Notification;
use crate::providers::{ProviderResponse, PushProvider};

/// Classification of one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// Provider accepted the notification (HTTP 200).
    Delivered,
    /// Provider answered with a non-200 status.
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },
    /// The request never produced a response (connect failure, timeout).
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Send `notification` through `provider` and classify the result.
///
/// Never returns an error: every delivery problem is an outcome, observed
/// once and logged. Retrying is deliberately out of scope.
pub async fn dispatch(notification: &Notification, provider: &dyn PushProvider) -> DeliveryOutcome {
    info!(provider = provider.name(), "Sending {notification}");

    match provider
        .send_notification(
            notification.app_label(),
            &notification.title,
            &notification.merged_text,
        )
        .await
    {
        Ok(response) => classify(provider.name(), response),
        Err(e) => {
            warn!(
                provider = provider.name(),
                "Delivery failed before a response: {e}"
            );
            DeliveryOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn classify(provider: &str, response: ProviderResponse) -> DeliveryOutcome {
    if response.is_success() {
        DeliveryOutcome::Delivered
    } else {
        warn!(
            provider,
            status = response.status,
            reason = %response.reason,
            body = %response.body,
            "Provider rejected notification"
        );
        DeliveryOutcome::Rejected {
            status: response.status,
            reason: response.reason,
            body: response.body,
        }
    }
}
