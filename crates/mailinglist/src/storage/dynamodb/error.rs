//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `DatabaseError` from `mailinglist_core::storage`.
//! Only a failed put condition is classified; every other error keeps the
//! SDK's own message.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use mailinglist_core::storage::DatabaseError;

/// Pass an SDK error through as `DatabaseError::Backend`.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>) -> DatabaseError
where
    E: StdError + 'static,
    R: Debug,
{
    DatabaseError::Backend(DisplayErrorContext(&err).to_string())
}

/// Map a PutItem SDK error, turning a failed `attribute_not_exists`
/// condition into `AlreadyExists`.
pub fn map_put_item_error<R: Debug>(
    err: SdkError<PutItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> DatabaseError {
    if err
        .as_service_error()
        .is_some_and(|e| e.is_conditional_check_failed_exception())
    {
        return DatabaseError::AlreadyExists {
            entity_type,
            id: id.into(),
        };
    }
    map_sdk_error(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ProvisionedThroughputExceededException,
    };

    #[test]
    fn test_condition_failure_is_already_exists() {
        let err = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            ),
            (),
        );

        assert_eq!(
            map_put_item_error(err, "Subscription", "bob@example.com"),
            DatabaseError::AlreadyExists {
                entity_type: "Subscription",
                id: "bob@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_other_put_errors_pass_through() {
        let err = SdkError::service_error(
            PutItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("Rate exceeded")
                    .build(),
            ),
            (),
        );

        match map_put_item_error(err, "Subscription", "bob@example.com") {
            DatabaseError::Backend(message) => assert!(message.contains("Rate exceeded")),
            other => panic!("expected Backend, got {:?}", other),
        }
    }

    #[test]
    fn test_construction_failure_passes_through() {
        let err: SdkError<PutItemError, ()> =
            SdkError::construction_failure("missing table name");

        match map_sdk_error(err) {
            DatabaseError::Backend(message) => assert!(message.contains("missing table name")),
            other => panic!("expected Backend, got {:?}", other),
        }
    }
}
