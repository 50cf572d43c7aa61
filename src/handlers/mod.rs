//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Extracts and validates request data (JSON body, path params)
//! 2. Calls the subscription service
//! 3. Returns a JSON response or an `AppError`

/// Service health endpoint
pub mod health;
/// Subscription CRUD and cost endpoints
pub mod subscriptions;
