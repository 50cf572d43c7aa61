//! Subscription persistence.
//!
//! [`SubscriptionRepository`] is the seam between the service layer and the
//! store. [`PgSubscriptionRepository`] talks to PostgreSQL;
//! [`InMemorySubscriptionRepository`] keeps records in process and backs the
//! HTTP tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionParams};

pub use memory::InMemorySubscriptionRepository;
pub use postgres::PgSubscriptionRepository;

/// Storage operations on the `subscription` table.
///
/// Each operation is a single statement; there are no multi-step
/// transactions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a record under a freshly generated id and return that id.
    async fn create(&self, subscription: NewSubscription) -> Result<Uuid, RepositoryError>;

    /// List records, filtered by `params.user_id` only, ordered by
    /// `(start_date, id)` and paginated by `params.page` / `params.limit`.
    async fn get(&self, params: &SubscriptionParams) -> Result<Vec<Subscription>, RepositoryError>;

    /// Remove a record. Fails with `NotFound` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Replace every field of a record, clearing `end_date` when absent.
    /// Fails with `NotFound` when no row matched.
    async fn update(&self, id: Uuid, subscription: NewSubscription) -> Result<(), RepositoryError>;

    /// `SUM(price)` over records matching the supplied filters, 0 if none.
    async fn get_cost(&self, params: &SubscriptionParams) -> Result<i64, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
