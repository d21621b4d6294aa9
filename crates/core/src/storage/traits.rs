use async_trait::async_trait;

use crate::subscription::{Confirmation, Subscription};

use super::Result;

/// Callback invoked once per subscription during a listing.
///
/// Returning an error stops the listing; the error is handed back to the caller.
pub type ListSubscriptionsFn<'a> = dyn FnMut(Subscription) -> Result<()> + Send + 'a;

/// Callback invoked once per confirmation during a listing.
pub type ListConfirmationsFn<'a> = dyn FnMut(Confirmation) -> Result<()> + Send + 'a;

/// Storage for subscriptions, keyed by address.
#[async_trait]
pub trait SubscriptionsDatabase: Send + Sync {
    /// Gets a subscription by address, or `NotFound`.
    async fn get_subscription_with_address(&self, address: &str) -> Result<Subscription>;

    /// Inserts a new subscription, or fails with `AlreadyExists`.
    async fn add_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Writes a subscription whether or not it already exists.
    async fn update_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Deletes a subscription by address. Deleting a missing record succeeds.
    async fn remove_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Calls `callback` for every confirmed subscription.
    async fn list_subscriptions_confirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()>;

    /// Calls `callback` for every subscription that has not been confirmed.
    async fn list_subscriptions_unconfirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()>;
}

/// Storage for pending confirmation codes.
#[async_trait]
pub trait ConfirmationsDatabase: Send + Sync {
    /// Gets a confirmation by code, or `NotFound`.
    async fn get_confirmation_with_code(&self, code: &str) -> Result<Confirmation>;

    /// Inserts a new confirmation, or fails with `AlreadyExists`.
    async fn add_confirmation(&self, confirmation: &Confirmation) -> Result<()>;

    /// Deletes a confirmation by code. Deleting a missing record succeeds.
    async fn remove_confirmation(&self, confirmation: &Confirmation) -> Result<()>;

    /// Calls `callback` for every stored confirmation.
    async fn list_confirmations(&self, callback: &mut ListConfirmationsFn<'_>) -> Result<()>;
}
