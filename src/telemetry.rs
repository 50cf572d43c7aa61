//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber. The filter comes from `RUST_LOG`
//! when set, otherwise from `LOGGER_LEVEL`. Output is JSON unless
//! `LOGGER_FORMAT=text`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Anything other than `text` falls back to JSON.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("text") {
            LogFormat::Text
        } else {
            LogFormat::Json
        }
    }
}

/// Map a configured level name to a filter, `None` if unrecognised.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

/// Initialize the global subscriber.
///
/// Must be called once, before any other component logs.
pub fn init_tracing(level: &str, format: &str) {
    let level_filter = parse_level(level);
    let default_level = level_filter.unwrap_or(LevelFilter::INFO);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{default_level},sqlx=warn,tower_http={}",
            if default_level == LevelFilter::DEBUG {
                "debug"
            } else {
                "warn"
            }
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match LogFormat::parse(format) {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
    }

    if level_filter.is_none() && !level.is_empty() {
        tracing::warn!(level, "unknown LOGGER_LEVEL, using INFO");
    }

    tracing::info!("Logger initialized");
}
