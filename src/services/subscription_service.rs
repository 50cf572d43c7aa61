//! Subscription service.
//!
//! Forwards every call to the repository unchanged. Validation happens in the
//! handlers; this layer only tags failures with the method they came from so
//! the logged error names its call site.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{RepositoryError, ServiceError};
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionParams};
use crate::repository::SubscriptionRepository;

fn context(operation: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |source| ServiceError { operation, source }
}

#[derive(Clone)]
pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, subscription: NewSubscription) -> Result<Uuid, ServiceError> {
        self.repository
            .create(subscription)
            .await
            .map_err(context("create"))
    }

    pub async fn get(&self, params: &SubscriptionParams) -> Result<Vec<Subscription>, ServiceError> {
        self.repository.get(params).await.map_err(context("get"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repository.delete(id).await.map_err(context("delete"))
    }

    pub async fn update(&self, id: Uuid, subscription: NewSubscription) -> Result<(), ServiceError> {
        self.repository
            .update(id, subscription)
            .await
            .map_err(context("update"))
    }

    pub async fn get_cost(&self, params: &SubscriptionParams) -> Result<i64, ServiceError> {
        self.repository
            .get_cost(params)
            .await
            .map_err(context("get_cost"))
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.repository.ping().await.map_err(context("ping"))
    }
}
