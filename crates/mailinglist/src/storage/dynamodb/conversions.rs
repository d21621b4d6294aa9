//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use mailinglist_core::storage::DatabaseError;
use mailinglist_core::subscription::{
    Confirmation, ConfirmationAction, Subscription, SubscriptionStatus,
};

pub type Item = HashMap<String, AttributeValue>;

pub const ENTITY_TYPE_SUBSCRIPTION: &str = "Subscription";
pub const ENTITY_TYPE_CONFIRMATION: &str = "Confirmation";

// ============================================================================
// Attribute names
// ============================================================================

pub const ATTR_ADDRESS: &str = "address";
pub const ATTR_CREATED: &str = "created";
pub const ATTR_CONFIRMED: &str = "confirmed";
pub const ATTR_LAST_MODIFIED: &str = "lastmodified";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_CODE: &str = "code";
pub const ATTR_ACTION: &str = "action";

// ============================================================================
// Subscription conversions
// ============================================================================

/// Convert a Subscription to DynamoDB item.
///
/// An unconfirmed subscription is written with `confirmed = 0`; confirmation
/// times are always positive.
pub fn subscription_to_item(subscription: &Subscription) -> Item {
    let mut item = HashMap::new();

    item.insert(
        ATTR_ADDRESS.to_string(),
        AttributeValue::S(subscription.address.clone()),
    );
    item.insert(
        ATTR_CREATED.to_string(),
        timestamp_value(subscription.created()),
    );
    item.insert(
        ATTR_CONFIRMED.to_string(),
        match subscription.confirmed() {
            Some(confirmed) => timestamp_value(confirmed),
            None => AttributeValue::N("0".to_string()),
        },
    );
    item.insert(
        ATTR_LAST_MODIFIED.to_string(),
        timestamp_value(subscription.last_modified()),
    );
    item.insert(
        ATTR_STATUS.to_string(),
        AttributeValue::N(subscription.status.code().to_string()),
    );

    item
}

/// Convert a DynamoDB item to Subscription.
///
/// An item without an address is treated as a missing record. A `confirmed`
/// value that is absent, zero or negative means unconfirmed.
pub fn item_to_subscription(item: &Item) -> Result<Subscription, DatabaseError> {
    let address = get_optional_string(item, ATTR_ADDRESS).unwrap_or_default();
    if address.is_empty() {
        return Err(DatabaseError::NotFound {
            entity_type: ENTITY_TYPE_SUBSCRIPTION,
            id: address,
        });
    }

    let confirmed = match get_optional_number(item, ATTR_CONFIRMED)? {
        Some(secs) if secs > 0 => Some(timestamp_from_secs(ATTR_CONFIRMED, secs)?),
        _ => None,
    };

    let status_code = get_number(item, ATTR_STATUS)?;
    let status = u8::try_from(status_code)
        .ok()
        .and_then(SubscriptionStatus::from_code)
        .ok_or_else(|| DatabaseError::InvalidData(format!("Invalid status: {}", status_code)))?;

    Subscription::from_parts(
        address,
        get_timestamp(item, ATTR_CREATED)?,
        confirmed,
        get_timestamp(item, ATTR_LAST_MODIFIED)?,
        status,
    )
    .map_err(|e| DatabaseError::InvalidData(e.to_string()))
}

/// Key of the subscription item for `address`.
pub fn subscription_key(address: &str) -> (String, AttributeValue) {
    (
        ATTR_ADDRESS.to_string(),
        AttributeValue::S(address.to_string()),
    )
}

// ============================================================================
// Confirmation conversions
// ============================================================================

/// Convert a Confirmation to DynamoDB item.
pub fn confirmation_to_item(confirmation: &Confirmation) -> Item {
    let mut item = HashMap::new();

    item.insert(
        ATTR_CODE.to_string(),
        AttributeValue::S(confirmation.code.clone()),
    );
    item.insert(
        ATTR_ADDRESS.to_string(),
        AttributeValue::S(confirmation.address.clone()),
    );
    item.insert(
        ATTR_ACTION.to_string(),
        AttributeValue::S(confirmation.action.as_str().to_string()),
    );
    item.insert(
        ATTR_CREATED.to_string(),
        timestamp_value(confirmation.created()),
    );

    item
}

/// Convert a DynamoDB item to Confirmation.
pub fn item_to_confirmation(item: &Item) -> Result<Confirmation, DatabaseError> {
    let code = get_optional_string(item, ATTR_CODE).unwrap_or_default();
    if code.is_empty() {
        return Err(DatabaseError::NotFound {
            entity_type: ENTITY_TYPE_CONFIRMATION,
            id: code,
        });
    }

    let action = get_string(item, ATTR_ACTION)?;

    Ok(Confirmation::from_parts(
        code,
        get_string(item, ATTR_ADDRESS)?,
        ConfirmationAction::parse(&action)
            .ok_or_else(|| DatabaseError::InvalidData(format!("Invalid action: {}", action)))?,
        get_timestamp(item, ATTR_CREATED)?,
    ))
}

/// Key of the confirmation item for `code`.
pub fn confirmation_key(code: &str) -> (String, AttributeValue) {
    (ATTR_CODE.to_string(), AttributeValue::S(code.to_string()))
}

// ============================================================================
// Helper functions
// ============================================================================

fn timestamp_value(dt: DateTime<Utc>) -> AttributeValue {
    AttributeValue::N(dt.timestamp().to_string())
}

fn timestamp_from_secs(key: &str, secs: i64) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DatabaseError::InvalidData(format!("Invalid timestamp {}: {}", key, secs)))
}

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, DatabaseError> {
    get_optional_string(item, key)
        .ok_or_else(|| DatabaseError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required integer attribute.
fn get_number(item: &Item, key: &str) -> Result<i64, DatabaseError> {
    get_optional_number(item, key)?
        .ok_or_else(|| DatabaseError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional integer attribute. Present but non-numeric is an error.
fn get_optional_number(item: &Item, key: &str) -> Result<Option<i64>, DatabaseError> {
    match item.get(key) {
        None => Ok(None),
        Some(value) => {
            let n = value.as_n().map_err(|_| {
                DatabaseError::InvalidData(format!("Missing or invalid field: {}", key))
            })?;
            n.parse()
                .map(Some)
                .map_err(|e| DatabaseError::InvalidData(format!("Invalid number {}: {}", key, e)))
        }
    }
}

/// Get a required unix-seconds timestamp attribute.
fn get_timestamp(item: &Item, key: &str) -> Result<DateTime<Utc>, DatabaseError> {
    let secs = get_number(item, key)?;
    timestamp_from_secs(key, secs)
}
