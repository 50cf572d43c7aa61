//! Data models representing database entities and API payloads.

/// Subscription entity, request bodies and response envelopes
pub mod subscription;
