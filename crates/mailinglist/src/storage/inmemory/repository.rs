//! In-memory database implementation.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mailinglist_core::storage::{
    drain_pages, ConfirmationFilter, ConfirmationsDatabase, DatabaseError, ListConfirmationsFn,
    ListSubscriptionsFn, Page, Result, SubscriptionsDatabase,
};
use mailinglist_core::subscription::{Confirmation, Subscription};

/// Number of records examined per page when listing.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory storage backend for testing.
///
/// Uses BTreeMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Listings walk the keys in order one page at a time and release the lock
/// between pages, so callbacks may write back to the same database.
/// Data is not persisted and will be lost when the database is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    subscriptions: Arc<RwLock<BTreeMap<String, Subscription>>>,
    confirmations: Arc<RwLock<BTreeMap<String, Confirmation>>>,
    page_size: usize,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDatabase {
    /// Creates a new empty in-memory database.
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(RwLock::new(BTreeMap::new())),
            confirmations: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many records each listing page examines. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    async fn subscription_page(
        &self,
        filter: ConfirmationFilter,
        after: Option<String>,
    ) -> Result<Page<Subscription, String>> {
        let subscriptions = self.subscriptions.read().await;
        let (scanned, next) = scan_keys(&subscriptions, after, self.page_size);

        Ok(Page {
            items: scanned.into_iter().filter(|s| filter.matches(s)).collect(),
            next,
        })
    }

    async fn confirmation_page(&self, after: Option<String>) -> Result<Page<Confirmation, String>> {
        let confirmations = self.confirmations.read().await;
        let (items, next) = scan_keys(&confirmations, after, self.page_size);

        Ok(Page { items, next })
    }
}

/// Reads up to `limit` records after `after`, plus the cursor for the next
/// page if any records remain.
fn scan_keys<V: Clone>(
    map: &BTreeMap<String, V>,
    after: Option<String>,
    limit: usize,
) -> (Vec<V>, Option<String>) {
    let lower = match after {
        Some(key) => Bound::Excluded(key),
        None => Bound::Unbounded,
    };

    let mut range = map.range((lower, Bound::Unbounded));
    let page: Vec<(&String, &V)> = range.by_ref().take(limit).collect();

    let next = match (page.last(), range.next()) {
        (Some((last, _)), Some(_)) => Some((*last).clone()),
        _ => None,
    };

    (page.into_iter().map(|(_, v)| v.clone()).collect(), next)
}

#[async_trait]
impl SubscriptionsDatabase for InMemoryDatabase {
    async fn get_subscription_with_address(&self, address: &str) -> Result<Subscription> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(address)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "Subscription",
                id: address.to_string(),
            })
    }

    async fn add_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains_key(&subscription.address) {
            return Err(DatabaseError::AlreadyExists {
                entity_type: "Subscription",
                id: subscription.address.clone(),
            });
        }
        subscriptions.insert(subscription.address.clone(), subscription.clone());
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(subscription.address.clone(), subscription.clone());
        Ok(())
    }

    async fn remove_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(&subscription.address);
        Ok(())
    }

    async fn list_subscriptions_confirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()> {
        let filter = ConfirmationFilter::Confirmed;
        drain_pages(|after| self.subscription_page(filter, after), callback).await?;
        Ok(())
    }

    async fn list_subscriptions_unconfirmed(
        &self,
        callback: &mut ListSubscriptionsFn<'_>,
    ) -> Result<()> {
        let filter = ConfirmationFilter::Unconfirmed;
        drain_pages(|after| self.subscription_page(filter, after), callback).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfirmationsDatabase for InMemoryDatabase {
    async fn get_confirmation_with_code(&self, code: &str) -> Result<Confirmation> {
        let confirmations = self.confirmations.read().await;
        confirmations
            .get(code)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "Confirmation",
                id: code.to_string(),
            })
    }

    async fn add_confirmation(&self, confirmation: &Confirmation) -> Result<()> {
        let mut confirmations = self.confirmations.write().await;
        if confirmations.contains_key(&confirmation.code) {
            return Err(DatabaseError::AlreadyExists {
                entity_type: "Confirmation",
                id: confirmation.code.clone(),
            });
        }
        confirmations.insert(confirmation.code.clone(), confirmation.clone());
        Ok(())
    }

    async fn remove_confirmation(&self, confirmation: &Confirmation) -> Result<()> {
        let mut confirmations = self.confirmations.write().await;
        confirmations.remove(&confirmation.code);
        Ok(())
    }

    async fn list_confirmations(&self, callback: &mut ListConfirmationsFn<'_>) -> Result<()> {
        drain_pages(|after| self.confirmation_page(after), callback).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use mailinglist_core::subscription::{ConfirmationAction, SubscriptionStatus};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn confirmed(address: &str) -> Subscription {
        let mut subscription = Subscription::new_at(address, at(1_700_000_000));
        subscription.confirm(at(1_700_000_600)).unwrap();
        subscription
    }

    async fn seed(db: &InMemoryDatabase, confirmed_count: usize, pending_count: usize) {
        for i in 0..confirmed_count {
            db.add_subscription(&confirmed(&format!("c{:03}@example.com", i)))
                .await
                .unwrap();
        }
        for i in 0..pending_count {
            db.add_subscription(&Subscription::new(format!("p{:03}@example.com", i)))
                .await
                .unwrap();
        }
    }

    async fn collect_confirmed(db: &InMemoryDatabase) -> Vec<String> {
        let mut seen = Vec::new();
        db.list_subscriptions_confirmed(&mut |s| {
            seen.push(s.address);
            Ok(())
        })
        .await
        .unwrap();
        seen
    }

    async fn collect_unconfirmed(db: &InMemoryDatabase) -> Vec<String> {
        let mut seen = Vec::new();
        db.list_subscriptions_unconfirmed(&mut |s| {
            seen.push(s.address);
            Ok(())
        })
        .await
        .unwrap();
        seen
    }

    // ==================== Subscription CRUD Tests ====================

    #[tokio::test]
    async fn test_subscription_add_and_get() {
        let db = InMemoryDatabase::new();
        let subscription = confirmed("alice@example.com");

        db.add_subscription(&subscription).await.unwrap();

        let retrieved = db
            .get_subscription_with_address("alice@example.com")
            .await
            .unwrap();
        assert_eq!(retrieved, subscription);
    }

    #[tokio::test]
    async fn test_subscription_get_nonexistent() {
        let db = InMemoryDatabase::new();
        let result = db.get_subscription_with_address("nobody@example.com").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_subscription_add_existing_keeps_stored_record() {
        let db = InMemoryDatabase::new();
        let original = Subscription::new_at("alice@example.com", at(1_700_000_000));
        db.add_subscription(&original).await.unwrap();

        let mut replacement = original.clone();
        replacement.set_status(SubscriptionStatus::Blocked, at(1_700_000_900));
        let result = db.add_subscription(&replacement).await;

        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
        let stored = db
            .get_subscription_with_address("alice@example.com")
            .await
            .unwrap();
        assert_eq!(stored, original);
    }

    #[tokio::test]
    async fn test_subscription_update_is_upsert() {
        let db = InMemoryDatabase::new();
        let mut subscription = Subscription::new_at("alice@example.com", at(1_700_000_000));

        db.update_subscription(&subscription).await.unwrap();
        assert_eq!(
            db.get_subscription_with_address("alice@example.com")
                .await
                .unwrap(),
            subscription
        );

        subscription.confirm(at(1_700_000_600)).unwrap();
        db.update_subscription(&subscription).await.unwrap();

        let retrieved = db
            .get_subscription_with_address("alice@example.com")
            .await
            .unwrap();
        assert!(retrieved.is_confirmed());
        assert_eq!(retrieved.status, SubscriptionStatus::Enabled);
    }

    #[tokio::test]
    async fn test_subscription_remove_then_get() {
        let db = InMemoryDatabase::new();
        let subscription = Subscription::new("alice@example.com");

        db.add_subscription(&subscription).await.unwrap();
        db.remove_subscription(&subscription).await.unwrap();

        let result = db.get_subscription_with_address("alice@example.com").await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_subscription_remove_nonexistent_succeeds() {
        let db = InMemoryDatabase::new();
        let result = db
            .remove_subscription(&Subscription::new("nobody@example.com"))
            .await;
        assert!(result.is_ok());
    }

    // ==================== Listing Tests ====================

    #[tokio::test]
    async fn test_list_visits_each_record_once_across_pages() {
        let db = InMemoryDatabase::new().with_page_size(3);
        seed(&db, 7, 5).await;

        let confirmed = collect_confirmed(&db).await;
        let unconfirmed = collect_unconfirmed(&db).await;

        assert_eq!(confirmed.len(), 7);
        assert_eq!(unconfirmed.len(), 5);

        let mut all: Vec<String> = confirmed.into_iter().chain(unconfirmed).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[tokio::test]
    async fn test_list_page_size_boundaries() {
        for page_size in [1, 4, 5, 6, 100] {
            let db = InMemoryDatabase::new().with_page_size(page_size);
            seed(&db, 5, 0).await;

            assert_eq!(collect_confirmed(&db).await.len(), 5, "page size {}", page_size);
            assert!(collect_unconfirmed(&db).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_list_empty_database() {
        let db = InMemoryDatabase::new();
        assert!(collect_confirmed(&db).await.is_empty());
        assert!(collect_unconfirmed(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_callback_error_stops_listing() {
        let db = InMemoryDatabase::new().with_page_size(2);
        seed(&db, 6, 0).await;

        let mut calls = 0;
        let result = db
            .list_subscriptions_confirmed(&mut |_| {
                calls += 1;
                if calls == 3 {
                    return Err(DatabaseError::Callback("bounce".to_string()));
                }
                Ok(())
            })
            .await;

        assert_eq!(result, Err(DatabaseError::Callback("bounce".to_string())));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_confirming_moves_record_between_listings() {
        let db = InMemoryDatabase::new();
        let mut subscription = Subscription::new("alice@example.com");
        db.add_subscription(&subscription).await.unwrap();

        assert_eq!(collect_unconfirmed(&db).await, vec!["alice@example.com"]);

        subscription.confirm(Utc::now()).unwrap();
        db.update_subscription(&subscription).await.unwrap();

        assert!(collect_unconfirmed(&db).await.is_empty());
        assert_eq!(collect_confirmed(&db).await, vec!["alice@example.com"]);
    }

    #[test]
    fn test_scan_keys_cursor() {
        let map: BTreeMap<String, u8> = (0..5u8).map(|i| (format!("k{}", i), i)).collect();

        let (first, next) = scan_keys(&map, None, 2);
        assert_eq!(first, vec![0, 1]);
        assert_eq!(next.as_deref(), Some("k1"));

        let (second, next) = scan_keys(&map, next, 2);
        assert_eq!(second, vec![2, 3]);

        let (last, next) = scan_keys(&map, next, 2);
        assert_eq!(last, vec![4]);
        assert_eq!(next, None);

        let (exact, next) = scan_keys(&map, None, 5);
        assert_eq!(exact.len(), 5);
        assert_eq!(next, None);
    }

    // ==================== Confirmation CRUD Tests ====================

    #[tokio::test]
    async fn test_confirmation_lifecycle() {
        let db = InMemoryDatabase::new();
        let confirmation = Confirmation::new("alice@example.com", ConfirmationAction::Subscribe);

        db.add_confirmation(&confirmation).await.unwrap();
        assert_eq!(
            db.get_confirmation_with_code(&confirmation.code)
                .await
                .unwrap(),
            confirmation
        );

        let duplicate = db.add_confirmation(&confirmation).await;
        assert!(duplicate.unwrap_err().is_already_exists());

        db.remove_confirmation(&confirmation).await.unwrap();
        assert!(db
            .get_confirmation_with_code(&confirmation.code)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_list_confirmations_across_pages() {
        let db = InMemoryDatabase::new().with_page_size(2);
        for i in 0..5 {
            let confirmation =
                Confirmation::new(format!("u{}@example.com", i), ConfirmationAction::Unsubscribe);
            db.add_confirmation(&confirmation).await.unwrap();
        }

        let mut seen = 0;
        db.list_confirmations(&mut |c| {
            assert_eq!(c.action, ConfirmationAction::Unsubscribe);
            seen += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(seen, 5);
    }
}
