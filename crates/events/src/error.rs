//! Notification error types.

use thiserror::Error;

/// Errors that can occur while raising an event.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A subscriber failed to handle the event.
    ///
    /// `delivered` counts the subscribers that handled the event before
    /// this one failed. Subscribers report 0; the bus fills in the count.
    #[error("Subscriber '{subscriber}' failed after {delivered} deliveries: {reason}")]
    Subscriber {
        subscriber: &'static str,
        reason: String,
        delivered: usize,
    },

    /// Failed to serialize the event payload.
    #[error("Event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NotifyError {
    /// Returns how many subscribers saw the event before the failure.
    pub fn delivered(&self) -> usize {
        match self {
            NotifyError::Subscriber { delivered, .. } => *delivered,
            NotifyError::Serialization(_) => 0,
        }
    }

    /// Records that the event reached `count` subscribers before this error.
    pub fn after_deliveries(self, count: usize) -> Self {
        match self {
            NotifyError::Subscriber {
                subscriber, reason, ..
            } => NotifyError::Subscriber {
                subscriber,
                reason,
                delivered: count,
            },
            other => other,
        }
    }
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_deliveries_sets_count_on_subscriber_errors() {
        let err = NotifyError::Subscriber {
            subscriber: "audit",
            reason: "offline".to_string(),
            delivered: 0,
        }
        .after_deliveries(2);

        assert_eq!(err.delivered(), 2);
        assert!(err.to_string().contains("after 2 deliveries"));
    }

    #[test]
    fn serialization_errors_report_no_deliveries() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = NotifyError::from(json_err).after_deliveries(3);
        assert_eq!(err.delivered(), 0);
    }
}
