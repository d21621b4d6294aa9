//! DynamoDB subscriptions database.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use mailinglist_core::storage::{
    drain_pages, ConfirmationFilter, DatabaseError, ListSubscriptionsFn, Page, Result,
    SubscriptionsDatabase,
};
use mailinglist_core::subscription::Subscription;

use super::client::create_client;
use super::conversions::{
    item_to_subscription, subscription_key, subscription_to_item, Item, ATTR_ADDRESS,
    ATTR_CONFIRMED, ENTITY_TYPE_SUBSCRIPTION,
};
use super::error::{map_put_item_error, map_sdk_error};
use super::setup::{self, subscriptions_table_config};
use crate::config::{AwsConfig, DatabaseOptions};

/// Subscriptions stored in a DynamoDB table keyed by `address`.
#[derive(Debug, Clone)]
pub struct DynamoDbSubscriptionsDatabase {
    client: Client,
    options: DatabaseOptions,
}

impl DynamoDbSubscriptionsDatabase {
    /// Creates a database over an existing client.
    ///
    /// When `options.create_table` is set the table is created if missing
    /// before this returns.
    pub async fn new(client: Client, options: DatabaseOptions) -> setup::Result<Self> {
        if options.create_table {
            setup::ensure_table(&client, &subscriptions_table_config(&options)).await?;
        }

        Ok(Self { client, options })
    }

    /// Creates a database from a connection string.
    ///
    /// See [`crate::config::parse_dsn`] for the format.
    pub async fn with_dsn(dsn: &str, options: DatabaseOptions) -> setup::Result<Self> {
        let aws_config = AwsConfig::from_dsn(dsn)?;
        let client = create_client(&aws_config).await;
        Self::new(client, options).await
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.options.table_name
    }

    async fn scan_page(
        &self,
        filter: ConfirmationFilter,
        start_key: Option<Item>,
    ) -> Result<Page<Subscription, Item>> {
        let zero = AttributeValue::N("0".to_string());
        let request = self
            .client
            .scan()
            .table_name(&self.options.table_name)
            .set_exclusive_start_key(start_key)
            .set_limit(self.options.scan_limit)
            .expression_attribute_names("#confirmed", ATTR_CONFIRMED)
            .expression_attribute_values(":zero", zero);

        // Same split as `item_to_subscription`: only positive values are confirmed.
        let request = match filter {
            ConfirmationFilter::Confirmed => request.filter_expression("#confirmed > :zero"),
            ConfirmationFilter::Unconfirmed => request
                .filter_expression("attribute_not_exists(#confirmed) OR #confirmed <= :zero"),
        };

        let output = request.send().await.map_err(map_sdk_error)?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_subscription)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            next: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }

    async fn scan(
        &self,
        filter: ConfirmationFilter,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()> {
        let seen = drain_pages(|cursor| self.scan_page(filter, cursor), callback).await?;

        tracing::debug!(table = %self.options.table_name, ?filter, seen, "Scanned subscriptions");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionsDatabase for DynamoDbSubscriptionsDatabase {
    async fn get_subscription_with_address(&self, address: &str) -> Result<Subscription> {
        let (key, value) = subscription_key(address);
        let result = self
            .client
            .get_item()
            .table_name(&self.options.table_name)
            .key(key, value)
            .send()
            .await
            .map_err(map_sdk_error)?;

        match result.item {
            Some(item) => item_to_subscription(&item),
            None => Err(DatabaseError::NotFound {
                entity_type: ENTITY_TYPE_SUBSCRIPTION,
                id: address.to_string(),
            }),
        }
    }

    async fn add_subscription(&self, subscription: &Subscription) -> Result<()> {
        match self
            .get_subscription_with_address(&subscription.address)
            .await
        {
            Ok(_) => {
                return Err(DatabaseError::AlreadyExists {
                    entity_type: ENTITY_TYPE_SUBSCRIPTION,
                    id: subscription.address.clone(),
                })
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        // The condition catches a concurrent add between the lookup and the put.
        self.client
            .put_item()
            .table_name(&self.options.table_name)
            .set_item(Some(subscription_to_item(subscription)))
            .condition_expression("attribute_not_exists(#address)")
            .expression_attribute_names("#address", ATTR_ADDRESS)
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(e, ENTITY_TYPE_SUBSCRIPTION, subscription.address.clone())
            })?;

        tracing::debug!(
            table = %self.options.table_name,
            address = %subscription.address,
            "Added subscription"
        );
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.options.table_name)
            .set_item(Some(subscription_to_item(subscription)))
            .send()
            .await
            .map_err(map_sdk_error)?;

        tracing::debug!(
            table = %self.options.table_name,
            address = %subscription.address,
            "Updated subscription"
        );
        Ok(())
    }

    async fn remove_subscription(&self, subscription: &Subscription) -> Result<()> {
        let (key, value) = subscription_key(&subscription.address);
        self.client
            .delete_item()
            .table_name(&self.options.table_name)
            .key(key, value)
            .send()
            .await
            .map_err(map_sdk_error)?;

        tracing::debug!(
            table = %self.options.table_name,
            address = %subscription.address,
            "Removed subscription"
        );
        Ok(())
    }

    async fn list_subscriptions_confirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()> {
        self.scan(ConfirmationFilter::Confirmed, callback).await
    }

    async fn list_subscriptions_unconfirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()> {
        self.scan(ConfirmationFilter::Unconfirmed, callback).await
    }
}
