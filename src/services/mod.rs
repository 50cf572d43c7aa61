//! Business logic services.
//!
//! Services sit between HTTP handlers and persistence.

pub mod subscription_service;

pub use subscription_service::SubscriptionService;
