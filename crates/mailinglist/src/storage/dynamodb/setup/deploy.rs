//! Table setup operations.

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode as SdkBillingMode, KeySchemaElement, KeyType,
    ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;

use super::super::client::get_table_state;
use super::error::{Result, SetupError};
use super::planning::{calculate_setup_plan, AttributeType, SetupPlan, TableConfig, TableStatus};
use crate::config::BillingMode;

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

/// Creates the table if it is missing and waits until it is active.
///
/// Safe to run repeatedly and concurrently: a table created by someone else
/// between the check and the create is treated as already present.
pub async fn ensure_table(client: &Client, config: &TableConfig) -> Result<SetupPlan> {
    let current_state = get_table_state(client, &config.table_name).await?;
    let plan = calculate_setup_plan(current_state.as_ref(), config);

    tracing::debug!(table = %config.table_name, ?plan, "Calculated setup plan");

    execute_setup_plan(client, &plan).await?;
    Ok(plan)
}

/// Execute a setup plan.
pub async fn execute_setup_plan(client: &Client, plan: &SetupPlan) -> Result<()> {
    match plan {
        SetupPlan::CreateTable { config } => {
            create_table(client, config).await?;
            wait_for_table_active(client, &config.table_name).await?;
            tracing::info!(table = %config.table_name, "Table created");
        }
        SetupPlan::AwaitActive { table_name } => {
            wait_for_table_active(client, table_name).await?;
        }
        SetupPlan::Deleting { table_name } => {
            return Err(SetupError::TableDeleting {
                table_name: table_name.clone(),
            });
        }
        SetupPlan::Unusable { table_name, status } => {
            return Err(SetupError::TableUnusable {
                table_name: table_name.clone(),
                status: status.clone(),
            });
        }
        SetupPlan::NoChanges { .. } => {
            // Nothing to do
        }
    }
    Ok(())
}

async fn create_table(client: &Client, config: &TableConfig) -> Result<()> {
    let key_schema = KeySchemaElement::builder()
        .attribute_name(&config.partition_key.name)
        .key_type(KeyType::Hash)
        .build()
        .map_err(SetupError::from_sdk)?;

    let attribute_definition = AttributeDefinition::builder()
        .attribute_name(&config.partition_key.name)
        .attribute_type(to_scalar_type(&config.partition_key.attribute_type))
        .build()
        .map_err(SetupError::from_sdk)?;

    let mut request = client
        .create_table()
        .table_name(&config.table_name)
        .key_schema(key_schema)
        .attribute_definitions(attribute_definition);

    request = match config.billing_mode {
        BillingMode::PayPerRequest => request.billing_mode(SdkBillingMode::PayPerRequest),
        BillingMode::Provisioned {
            read_capacity_units,
            write_capacity_units,
        } => request.billing_mode(SdkBillingMode::Provisioned).provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(read_capacity_units)
                .write_capacity_units(write_capacity_units)
                .build()
                .map_err(SetupError::from_sdk)?,
        ),
    };

    match request.send().await {
        Ok(_) => Ok(()),
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_in_use_exception()) =>
        {
            tracing::debug!(table = %config.table_name, "Table already being created elsewhere");
            Ok(())
        }
        Err(err) => Err(SetupError::from_sdk(err)),
    }
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVATION_ATTEMPTS {
        match get_table_state(client, table_name).await?.map(|state| state.status) {
            Some(TableStatus::Active) => return Ok(()),
            Some(TableStatus::Deleting) => {
                return Err(SetupError::TableDeleting {
                    table_name: table_name.to_string(),
                })
            }
            Some(TableStatus::Unusable(status)) => {
                return Err(SetupError::TableUnusable {
                    table_name: table_name.to_string(),
                    status,
                })
            }
            Some(TableStatus::Creating | TableStatus::Updating) | None => {}
        }
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(SetupError::TableActivationTimeout {
        table_name: table_name.to_string(),
    })
}

fn to_scalar_type(attr_type: &AttributeType) -> ScalarAttributeType {
    match attr_type {
        AttributeType::String => ScalarAttributeType::S,
    }
}
