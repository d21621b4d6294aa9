//! AWS SDK client setup.

use aws_sdk_dynamodb::config::Credentials as StaticCredentials;
use aws_sdk_dynamodb::types::TableStatus as SdkTableStatus;
use aws_sdk_dynamodb::Client;

use crate::config::{AwsConfig, Credentials};

use super::setup::{SetupError, TableState, TableStatus};

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    sdk_config_loader = match &config.credentials {
        Credentials::Default => sdk_config_loader,
        Credentials::Anonymous => sdk_config_loader.credentials_provider(
            StaticCredentials::new("local", "local", None, None, "mailinglist-dsn"),
        ),
        Credentials::Profile(name) => sdk_config_loader.profile_name(name),
    };

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

/// Maps the reported status. Anything other than the four lifecycle states
/// (archiving, archived, inaccessible encryption credentials, missing, or
/// newer than this SDK) is unusable.
fn table_status(status: Option<&SdkTableStatus>) -> TableStatus {
    match status {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        Some(other) => TableStatus::Unusable(other.as_str().to_string()),
        None => TableStatus::Unusable("UNKNOWN".to_string()),
    }
}

/// Fetches current table state, returns None if table doesn't exist.
pub async fn get_table_state(
    client: &Client,
    table_name: &str,
) -> Result<Option<TableState>, SetupError> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(response) => {
            let table = response.table().ok_or_else(|| {
                SetupError::AwsSdk(format!("DescribeTable returned no table for {table_name}"))
            })?;

            Ok(Some(TableState {
                status: table_status(table.table_status()),
            }))
        }
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception()) =>
        {
            Ok(None)
        }
        Err(err) => Err(SetupError::from_sdk(err)),
    }
}
