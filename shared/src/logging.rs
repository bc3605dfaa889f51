//! Shared logging utilities for consistent tracing across all services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::{error, info};

/// Global service ID singleton - set once at startup
static SERVICE_ID: OnceLock<ServiceId> = OnceLock::new();

/// Identifies which component emitted a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceId {
    /// HTTP front door (the binary)
    WebServer,
    /// Drill and plan generation pipeline
    Generator,
    /// Recommendation scoring
    Recommender,
}

impl ServiceId {
    /// Initialize the global service ID for the webserver binary
    pub fn init_webserver() -> &'static ServiceId {
        SERVICE_ID.get_or_init(|| ServiceId::WebServer)
    }

    /// Get the global service ID, falling back to the webserver when nothing
    /// was initialised (library crates used from tests)
    pub fn current() -> &'static ServiceId {
        SERVICE_ID.get().unwrap_or(&ServiceId::WebServer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::WebServer => "webserver",
            ServiceId::Generator => "generator",
            ServiceId::Recommender => "recommender",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter directives used when the caller does not supply `RUST_LOG`
pub fn default_filter(base_level: &str) -> String {
    format!(
        "webserver={base_level},generator={base_level},recommender={base_level},shared={base_level},tower_http=debug,axum={base_level},reqwest=warn,hyper=warn"
    )
}

/// Initialize tracing subscriber with an optional log level.
///
/// `RUST_LOG` wins over the computed filter when it is set.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(base_level)));

    // try_init so a second call (tests, embedded use) is a no-op instead of a panic
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
}

/// Initialize tracing with the default `info` level
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for service-aware info logging
#[macro_export]
macro_rules! service_info {
    ($service:expr, $($arg:tt)*) => {
        tracing::info!(
            service = %$service,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for service-aware warning logging
#[macro_export]
macro_rules! service_warn {
    ($service:expr, $($arg:tt)*) => {
        tracing::warn!(
            service = %$service,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for service-aware error logging
#[macro_export]
macro_rules! service_error {
    ($service:expr, $($arg:tt)*) => {
        tracing::error!(
            service = %$service,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for service-aware debug logging
#[macro_export]
macro_rules! service_debug {
    ($service:expr, $($arg:tt)*) => {
        tracing::debug!(
            service = %$service,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(service: &ServiceId, details: &str) {
    info!(
        service = %service,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(service: &ServiceId, reason: &str) {
    info!(
        service = %service,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(service: &ServiceId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        service = %service,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(service: &ServiceId, message: &str) {
    info!(
        service = %service,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Contextual logging helper for progress updates
pub fn log_progress(service: &ServiceId, action: &str, details: &str) {
    info!(
        service = %service,
        timestamp = format_timestamp(),
        "📋 {}: {}",
        action,
        details
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_display() {
        assert_eq!(ServiceId::WebServer.to_string(), "webserver");
        assert_eq!(ServiceId::Generator.to_string(), "generator");
        assert_eq!(ServiceId::Recommender.to_string(), "recommender");
    }

    #[test]
    fn test_default_filter_covers_every_crate() {
        let filter = default_filter("debug");
        for target in ["webserver=debug", "generator=debug", "recommender=debug", "shared=debug"] {
            assert!(filter.contains(target), "missing {target} in {filter}");
        }
    }

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_tracing_with_level(Some("warn"));
        init_tracing();
    }
}
