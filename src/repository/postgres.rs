//! PostgreSQL implementation of [`SubscriptionRepository`].
//!
//! Statements with optional filters are assembled with [`QueryBuilder`]:
//! every value goes through `push_bind`, which emits numbered `$n`
//! placeholders, so no input is ever spliced into SQL text.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::SubscriptionRepository;
use crate::db::DbPool;
use crate::error::RepositoryError;
use crate::models::subscription::{
    NewSubscription, SUBSCRIPTION_TABLE, Subscription, SubscriptionParams,
};

const COLUMNS: &str = "id, service_name, price, user_id, start_date, end_date";

/// Append ` WHERE a AND b ...` clauses as filters are pushed.
struct Filters<'q, 'args> {
    builder: &'q mut QueryBuilder<'args, Postgres>,
    any: bool,
}

impl<'q, 'args> Filters<'q, 'args> {
    fn new(builder: &'q mut QueryBuilder<'args, Postgres>) -> Self {
        Self {
            builder,
            any: false,
        }
    }

    /// Push `<column> <op> $n` bound to `value`.
    fn push<T>(&mut self, column: &str, op: &str, value: T)
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        self.builder.push(if self.any { " AND " } else { " WHERE " });
        self.builder.push(column).push(" ").push(op).push(" ");
        self.builder.push_bind(value);
        self.any = true;
    }
}

/// `SELECT` for the list operation: user filter, fixed order, pagination.
pub(crate) fn list_query(params: &SubscriptionParams) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM {SUBSCRIPTION_TABLE}"));

    let mut filters = Filters::new(&mut builder);
    if let Some(user_id) = params.user_id {
        filters.push("user_id", "=", user_id);
    }

    builder.push(" ORDER BY start_date, id");

    if let Some(limit) = params.limit() {
        builder.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = params.offset() {
        builder.push(" OFFSET ").push_bind(offset);
    }

    builder
}

/// `SELECT SUM(price)` for the cost operation with every optional filter.
pub(crate) fn cost_query(params: &SubscriptionParams) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT COALESCE(SUM(price), 0)::BIGINT FROM {SUBSCRIPTION_TABLE}"
    ));

    let mut filters = Filters::new(&mut builder);
    if let Some(user_id) = params.user_id {
        filters.push("user_id", "=", user_id);
    }
    if let Some(service_name) = &params.service_name {
        filters.push("service_name", "=", service_name.clone());
    }
    if let Some(start_date) = params.start_date {
        filters.push("start_date", ">=", start_date);
    }
    if let Some(end_date) = params.end_date {
        filters.push("end_date", "<=", end_date);
    }

    builder
}

/// PostgreSQL subscription repository.
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: DbPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, subscription: NewSubscription) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();

        sqlx::query(&format!(
            "INSERT INTO {SUBSCRIPTION_TABLE} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(id)
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::query("create"))?;

        Ok(id)
    }

    async fn get(&self, params: &SubscriptionParams) -> Result<Vec<Subscription>, RepositoryError> {
        let mut query = list_query(params);

        query
            .build_query_as::<Subscription>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::query("get"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {SUBSCRIPTION_TABLE} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::query("delete"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        Ok(())
    }

    async fn update(&self, id: Uuid, subscription: NewSubscription) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE {SUBSCRIPTION_TABLE}
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            "#
        ))
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(subscription.user_id)
        .bind(subscription.start_date)
        // None binds NULL and clears a stored end date
        .bind(subscription.end_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::query("update"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        Ok(())
    }

    async fn get_cost(&self, params: &SubscriptionParams) -> Result<i64, RepositoryError> {
        let mut query = cost_query(params);

        query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::query("get_cost"))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::query("ping"))?;

        Ok(())
    }
}
