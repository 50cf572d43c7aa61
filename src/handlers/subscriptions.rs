//! Subscription HTTP handlers.
//!
//! This module implements the subscription API:
//! - POST /subscription/ - Create subscription
//! - GET /subscription/{user_id} - List a user's subscriptions (page 1, 10 per page)
//! - GET /subscription/{user_id}/{page}/{limit} - List with explicit pagination
//! - PUT /subscription/{id} - Replace subscription
//! - DELETE /subscription/{id} - Delete subscription
//! - POST /subscription/cost - Total price of matching subscriptions
//!
//! Every input is validated here; nothing invalid reaches the service.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::subscription::{
        CostRequest, CostResponse, CreatedResponse, Pagination, StatusResponse,
        SubscriptionParams, SubscriptionRequest, SubscriptionsResponse,
    },
    services::SubscriptionService,
};

/// Unwrap a JSON body, answering 400 for anything undecodable.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "undecodable request body");
        AppError::InvalidRequest("invalid request body".to_string())
    })
}

/// Unwrap path segments; a segment that does not decode (e.g. invalid
/// UTF-8 after percent-decoding) is reported like a malformed id.
fn path_params<T>(path: Result<Path<T>, PathRejection>, message: &str) -> Result<T, AppError> {
    path.map(|Path(params)| params).map_err(|rejection| {
        tracing::debug!(error = %rejection, "undecodable path");
        AppError::InvalidRequest(message.to_string())
    })
}

fn parse_uuid(raw: &str, message: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidRequest(message.to_string()))
}

const INVALID_USER_ID: &str = "invalid user_id format";
const INVALID_SUBSCRIPTION_ID: &str = "invalid subscription id";

fn subscription_id(path: Result<Path<String>, PathRejection>) -> Result<Uuid, AppError> {
    let raw = path_params(path, INVALID_SUBSCRIPTION_ID)?;
    parse_uuid(&raw, INVALID_SUBSCRIPTION_ID)
}

/// Create a subscription.
///
/// # Request Body
///
/// ```json
/// {
///   "service_name": "Yandex Plus",
///   "price": 400,
///   "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
///   "start_date": "07-2025",
///   "end_date": "12-2025"
/// }
/// ```
///
/// `end_date` is optional.
///
/// # Response
///
/// - **200**: `{"res": "ok", "uuid": "<new id>"}`
/// - **400**: missing field, non-positive price, bad date, end before start
/// - **500**: store failure
pub async fn create_subscription(
    State(service): State<SubscriptionService>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let subscription = json_body(payload)?.validate()?;

    let id = service.create(subscription).await?;
    tracing::info!(subscription_id = %id, "subscription created");

    Ok(Json(CreatedResponse::new(id)))
}

/// List a user's subscriptions with the default page.
pub async fn list_subscriptions(
    State(service): State<SubscriptionService>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SubscriptionsResponse>, AppError> {
    let user_id = path_params(path, INVALID_USER_ID)?;

    list(&service, &user_id, Pagination::default()).await
}

/// List a user's subscriptions with explicit pagination.
///
/// `page` and `limit` are lenient: anything unparsable or out of range
/// (page < 1, limit outside 1..=100) silently becomes page 1 / limit 10.
pub async fn list_subscriptions_paged(
    State(service): State<SubscriptionService>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> Result<Json<SubscriptionsResponse>, AppError> {
    let (user_id, page, limit) = path_params(path, INVALID_USER_ID)?;
    let pagination = Pagination::from_path(Some(&page), Some(&limit));

    list(&service, &user_id, pagination).await
}

async fn list(
    service: &SubscriptionService,
    user_id: &str,
    pagination: Pagination,
) -> Result<Json<SubscriptionsResponse>, AppError> {
    let user_id = parse_uuid(user_id, INVALID_USER_ID)?;

    let params = SubscriptionParams::for_user(user_id, pagination);
    let subscriptions = service.get(&params).await?;

    Ok(Json(SubscriptionsResponse::new(subscriptions)))
}

/// Delete a subscription by id.
///
/// # Response
///
/// - **200**: `{"res": "ok"}`
/// - **400**: malformed id
/// - **500**: store failure, including an id that does not exist
pub async fn delete_subscription(
    State(service): State<SubscriptionService>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = subscription_id(path)?;

    service.delete(id).await?;
    tracing::info!(subscription_id = %id, "subscription deleted");

    Ok(Json(StatusResponse::ok()))
}

/// Replace every field of a subscription.
///
/// Takes the same body as create. An absent `end_date` clears the stored one.
pub async fn update_subscription(
    State(service): State<SubscriptionService>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = subscription_id(path)?;
    let subscription = json_body(payload)?.validate()?;

    service.update(id, subscription).await?;
    tracing::info!(subscription_id = %id, "subscription updated");

    Ok(Json(StatusResponse::ok()))
}

/// Total price of subscriptions matching the optional filters.
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
///   "service_name": "Yandex Plus",
///   "start_date": "01-2025",
///   "end_date": "12-2025"
/// }
/// ```
///
/// Every field may be omitted; an empty body `{}` sums all subscriptions.
pub async fn get_cost(
    State(service): State<SubscriptionService>,
    payload: Result<Json<CostRequest>, JsonRejection>,
) -> Result<Json<CostResponse>, AppError> {
    let params = json_body(payload)?.into_params()?;

    let cost = service.get_cost(&params).await?;

    Ok(Json(CostResponse::new(cost)))
}
