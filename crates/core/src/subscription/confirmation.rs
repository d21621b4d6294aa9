use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a confirmation code authorizes once redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationAction {
    Subscribe,
    Unsubscribe,
}

impl ConfirmationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfirmationAction::Subscribe => "subscribe",
            ConfirmationAction::Unsubscribe => "unsubscribe",
        }
    }

    /// Parses a persisted action, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "subscribe" => Some(ConfirmationAction::Subscribe),
            "unsubscribe" => Some(ConfirmationAction::Unsubscribe),
            _ => None,
        }
    }
}

/// A pending double opt-in token, keyed by its code.
///
/// `created` is held at whole-second precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub code: String,
    pub address: String,
    pub action: ConfirmationAction,
    #[serde(with = "chrono::serde::ts_seconds")]
    created: DateTime<Utc>,
}

impl Confirmation {
    /// Creates a confirmation with a freshly generated code.
    pub fn new(address: impl Into<String>, action: ConfirmationAction) -> Self {
        Self {
            code: Uuid::new_v4().simple().to_string(),
            address: address.into(),
            action,
            created: Utc::now().trunc_subsecs(0),
        }
    }

    /// Rebuilds a confirmation from stored values.
    pub fn from_parts(
        code: impl Into<String>,
        address: impl Into<String>,
        action: ConfirmationAction,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            address: address.into(),
            action,
            created: created.trunc_subsecs(0),
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Sets a specific code (useful for testing).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets a specific creation time (useful for testing).
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created.trunc_subsecs(0);
        self
    }

    /// Returns true when `ttl` has elapsed since creation.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.created + ttl <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_distinct_codes() {
        let a = Confirmation::new("a@example.com", ConfirmationAction::Subscribe);
        let b = Confirmation::new("a@example.com", ConfirmationAction::Subscribe);

        assert_eq!(a.code.len(), 32);
        assert_ne!(a.code, b.code);
    }

    #[test]
    fn test_is_expired() {
        let created = Utc::now();
        let conf = Confirmation::new("a@example.com", ConfirmationAction::Unsubscribe)
            .with_created(created);

        assert!(!conf.is_expired(created + Duration::minutes(59), Duration::hours(1)));
        assert!(conf.is_expired(created + Duration::hours(1), Duration::hours(1)));
    }

    #[test]
    fn test_created_drops_subseconds() {
        let created = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        let conf = Confirmation::from_parts(
            "c0de",
            "a@example.com",
            ConfirmationAction::Subscribe,
            created,
        );

        assert_eq!(
            conf.created(),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap()
        );
        assert_eq!(conf.created().timestamp_subsec_nanos(), 0);

        let json = serde_json::to_value(&conf).unwrap();
        assert_eq!(json["created"], 1_700_000_000);
        assert_eq!(serde_json::from_value::<Confirmation>(json).unwrap(), conf);
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(
            ConfirmationAction::parse("Subscribe"),
            Some(ConfirmationAction::Subscribe)
        );
        assert_eq!(
            ConfirmationAction::parse(ConfirmationAction::Unsubscribe.as_str()),
            Some(ConfirmationAction::Unsubscribe)
        );
        assert_eq!(ConfirmationAction::parse("resubscribe"), None);
    }
}
