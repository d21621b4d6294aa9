use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::SubscriptionError;

/// Delivery status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Signed up but not yet confirmed.
    Pending,
    /// Confirmed and receiving mail.
    Enabled,
    /// Temporarily not receiving mail.
    Disabled,
    /// Refused by an operator; must not be re-enabled by the subscriber.
    Blocked,
}

impl SubscriptionStatus {
    /// Numeric code used when the status is persisted.
    pub fn code(self) -> u8 {
        match self {
            SubscriptionStatus::Pending => 0,
            SubscriptionStatus::Enabled => 1,
            SubscriptionStatus::Disabled => 2,
            SubscriptionStatus::Blocked => 3,
        }
    }

    /// Parses a persisted status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SubscriptionStatus::Pending),
            1 => Some(SubscriptionStatus::Enabled),
            2 => Some(SubscriptionStatus::Disabled),
            3 => Some(SubscriptionStatus::Blocked),
            _ => None,
        }
    }
}

/// A mailing list subscription, keyed by email address.
///
/// Timestamps are held at whole-second precision, the resolution they are
/// persisted with, and a confirmation time is always after the unix epoch.
/// Both hold for every value of this type, so the timestamp fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredSubscription")]
pub struct Subscription {
    pub address: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    confirmed: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds")]
    last_modified: DateTime<Utc>,
    pub status: SubscriptionStatus,
}

/// Serialized form, validated into a [`Subscription`].
#[derive(Deserialize)]
struct StoredSubscription {
    address: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    created: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    confirmed: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds")]
    last_modified: DateTime<Utc>,
    status: SubscriptionStatus,
}

impl TryFrom<StoredSubscription> for Subscription {
    type Error = SubscriptionError;

    fn try_from(stored: StoredSubscription) -> Result<Self, Self::Error> {
        Subscription::from_parts(
            stored.address,
            stored.created,
            stored.confirmed,
            stored.last_modified,
            stored.status,
        )
    }
}

impl Subscription {
    /// Creates a pending, unconfirmed subscription for `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self::new_at(address, Utc::now())
    }

    /// Creates a pending subscription with an explicit creation time.
    pub fn new_at(address: impl Into<String>, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            address: address.into(),
            created: now,
            confirmed: None,
            last_modified: now,
            status: SubscriptionStatus::Pending,
        }
    }

    /// Rebuilds a subscription from stored values.
    ///
    /// Timestamps are truncated to whole seconds.
    pub fn from_parts(
        address: impl Into<String>,
        created: DateTime<Utc>,
        confirmed: Option<DateTime<Utc>>,
        last_modified: DateTime<Utc>,
        status: SubscriptionStatus,
    ) -> Result<Self, SubscriptionError> {
        let address = address.into();
        if address.is_empty() {
            return Err(SubscriptionError::EmptyAddress);
        }

        Ok(Self {
            address,
            created: created.trunc_subsecs(0),
            confirmed: confirmed.map(confirmation_time).transpose()?,
            last_modified: last_modified.trunc_subsecs(0),
            status,
        })
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// When the subscriber confirmed; `None` until then.
    pub fn confirmed(&self) -> Option<DateTime<Utc>> {
        self.confirmed
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Returns true once the subscriber has confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Marks the subscription as confirmed and enabled.
    ///
    /// Fails without changing anything if `now` is not after the unix epoch.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), SubscriptionError> {
        let now = confirmation_time(now)?;
        self.confirmed = Some(now);
        self.status = SubscriptionStatus::Enabled;
        self.last_modified = now;
        Ok(())
    }

    /// Changes the delivery status.
    pub fn set_status(&mut self, status: SubscriptionStatus, now: DateTime<Utc>) {
        self.status = status;
        self.last_modified = now.trunc_subsecs(0);
    }
}

/// Stored confirmation times of zero or less mean "unconfirmed", so a real
/// one must be strictly positive.
fn confirmation_time(at: DateTime<Utc>) -> Result<DateTime<Utc>, SubscriptionError> {
    let at = at.trunc_subsecs(0);
    if at.timestamp() <= 0 {
        return Err(SubscriptionError::ConfirmedAtOrBeforeEpoch(at));
    }
    Ok(at)
}
