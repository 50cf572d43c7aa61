//! Subscription Service
//!
//! A REST API for managing user subscription records and computing the total
//! cost of subscriptions over a period.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, queries built with `QueryBuilder`
//! - **Format**: JSON requests/responses, dates as `MM-YYYY`
//!
//! # Layers
//!
//! 1. `handlers` validate input and build responses
//! 2. `services` forward to persistence, adding error context
//! 3. `repository` runs one SQL statement per operation

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod telemetry;
