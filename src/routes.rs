//! Router construction.
//!
//! Shared by `main` and the integration tests so both exercise the same
//! routes and middleware stack.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    handlers::{health, subscriptions},
    middleware::request_id::request_id_middleware,
    services::SubscriptionService,
};

/// Build the application router around a subscription service.
pub fn create_router(service: SubscriptionService) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/subscription/",
            post(subscriptions::create_subscription),
        )
        .route("/subscription", post(subscriptions::create_subscription))
        .route("/subscription/cost", post(subscriptions::get_cost))
        // One pattern serves both the user id (GET) and the subscription id
        // (PUT, DELETE); the router rejects differently named params here.
        .route(
            "/subscription/{id}",
            get(subscriptions::list_subscriptions)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .route(
            "/subscription/{id}/{page}/{limit}",
            get(subscriptions::list_subscriptions_paged),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        // Outermost, so the request span encloses tracing and handlers
        .layer(axum_middleware::from_fn(request_id_middleware))
        .with_state(service)
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
