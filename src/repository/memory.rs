//! In-process implementation of [`SubscriptionRepository`].
//!
//! Mirrors the PostgreSQL semantics: same ordering, pagination and filter
//! rules, including SQL's treatment of a missing `end_date` (a record with
//! no end date never satisfies an `end_date <=` bound).

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SubscriptionRepository;
use crate::error::RepositoryError;
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionParams};

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    records: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn matches_cost_filter(subscription: &Subscription, params: &SubscriptionParams) -> bool {
    params.user_id.is_none_or(|id| subscription.user_id == id)
        && params
            .service_name
            .as_deref()
            .is_none_or(|name| subscription.service_name == name)
        && params
            .start_date
            .is_none_or(|start| subscription.start_date >= start)
        && params
            .end_date
            .is_none_or(|end| subscription.end_date.is_some_and(|stored| stored <= end))
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: NewSubscription) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        self.records
            .write()
            .await
            .push(Subscription::from_new(id, subscription));

        Ok(id)
    }

    async fn get(&self, params: &SubscriptionParams) -> Result<Vec<Subscription>, RepositoryError> {
        let mut matching: Vec<Subscription> = self
            .records
            .read()
            .await
            .iter()
            .filter(|s| params.user_id.is_none_or(|id| s.user_id == id))
            .cloned()
            .collect();

        matching.sort_by(|a, b| (a.start_date, a.id).cmp(&(b.start_date, b.id)));

        let offset = params.offset().unwrap_or(0) as usize;
        let limit = params.limit().map_or(usize::MAX, |l| l as usize);

        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|s| s.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        records.remove(position);

        Ok(())
    }

    async fn update(&self, id: Uuid, subscription: NewSubscription) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        *record = Subscription::from_new(id, subscription);

        Ok(())
    }

    async fn get_cost(&self, params: &SubscriptionParams) -> Result<i64, RepositoryError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|s| matches_cost_filter(s, params))
            .map(|s| s.price)
            .sum())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
