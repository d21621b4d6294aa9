//! DynamoDB confirmations database.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;

use mailinglist_core::storage::{
    drain_pages, ConfirmationsDatabase, DatabaseError, ListConfirmationsFn, Page, Result,
};
use mailinglist_core::subscription::Confirmation;

use super::client::create_client;
use super::conversions::{
    confirmation_key, confirmation_to_item, item_to_confirmation, Item, ATTR_CODE,
    ENTITY_TYPE_CONFIRMATION,
};
use super::error::{map_put_item_error, map_sdk_error};
use super::setup::{self, confirmations_table_config};
use crate::config::{AwsConfig, DatabaseOptions};

/// Confirmation codes stored in a DynamoDB table keyed by `code`.
#[derive(Debug, Clone)]
pub struct DynamoDbConfirmationsDatabase {
    client: Client,
    options: DatabaseOptions,
}

impl DynamoDbConfirmationsDatabase {
    /// Creates a database over an existing client, creating the table first
    /// when `options.create_table` is set.
    pub async fn new(client: Client, options: DatabaseOptions) -> setup::Result<Self> {
        if options.create_table {
            setup::ensure_table(&client, &confirmations_table_config(&options)).await?;
        }

        Ok(Self { client, options })
    }

    /// Creates a database from a connection string.
    pub async fn with_dsn(dsn: &str, options: DatabaseOptions) -> setup::Result<Self> {
        let aws_config = AwsConfig::from_dsn(dsn)?;
        let client = create_client(&aws_config).await;
        Self::new(client, options).await
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.options.table_name
    }

    async fn scan_page(&self, start_key: Option<Item>) -> Result<Page<Confirmation, Item>> {
        let output = self
            .client
            .scan()
            .table_name(&self.options.table_name)
            .set_exclusive_start_key(start_key)
            .set_limit(self.options.scan_limit)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_confirmation)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            next: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }
}

#[async_trait]
impl ConfirmationsDatabase for DynamoDbConfirmationsDatabase {
    async fn get_confirmation_with_code(&self, code: &str) -> Result<Confirmation> {
        let (key, value) = confirmation_key(code);
        let result = self
            .client
            .get_item()
            .table_name(&self.options.table_name)
            .key(key, value)
            .send()
            .await
            .map_err(map_sdk_error)?;

        match result.item {
            Some(item) => item_to_confirmation(&item),
            None => Err(DatabaseError::NotFound {
                entity_type: ENTITY_TYPE_CONFIRMATION,
                id: code.to_string(),
            }),
        }
    }

    async fn add_confirmation(&self, confirmation: &Confirmation) -> Result<()> {
        match self.get_confirmation_with_code(&confirmation.code).await {
            Ok(_) => {
                return Err(DatabaseError::AlreadyExists {
                    entity_type: ENTITY_TYPE_CONFIRMATION,
                    id: confirmation.code.clone(),
                })
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        self.client
            .put_item()
            .table_name(&self.options.table_name)
            .set_item(Some(confirmation_to_item(confirmation)))
            .condition_expression("attribute_not_exists(#code)")
            .expression_attribute_names("#code", ATTR_CODE)
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(e, ENTITY_TYPE_CONFIRMATION, confirmation.code.clone())
            })?;

        tracing::debug!(
            table = %self.options.table_name,
            address = %confirmation.address,
            action = confirmation.action.as_str(),
            "Added confirmation"
        );
        Ok(())
    }

    async fn remove_confirmation(&self, confirmation: &Confirmation) -> Result<()> {
        let (key, value) = confirmation_key(&confirmation.code);
        self.client
            .delete_item()
            .table_name(&self.options.table_name)
            .key(key, value)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn list_confirmations(&self, callback: &mut ListConfirmationsFn<'_>) -> Result<()> {
        let seen = drain_pages(|cursor| self.scan_page(cursor), callback).await?;

        tracing::debug!(table = %self.options.table_name, seen, "Scanned confirmations");
        Ok(())
    }
}
