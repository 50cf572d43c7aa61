//! HTTP middleware components.

/// `X-Request-ID` generation and request-scoped logging
pub mod request_id;
