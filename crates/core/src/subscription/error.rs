use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when validating or manipulating subscriptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription address cannot be empty")]
    EmptyAddress,
    #[error("Confirmation time must be after the unix epoch: {0}")]
    ConfirmedAtOrBeforeEpoch(DateTime<Utc>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_error_display() {
        assert_eq!(
            SubscriptionError::EmptyAddress.to_string(),
            "Subscription address cannot be empty"
        );
        assert_eq!(
            SubscriptionError::ConfirmedAtOrBeforeEpoch(DateTime::UNIX_EPOCH).to_string(),
            "Confirmation time must be after the unix epoch: 1970-01-01 00:00:00 UTC"
        );
    }
}
