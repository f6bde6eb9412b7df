//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for
//!   debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: vigil_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: vigil_telemetry::TelemetryError,
    },
    /// Building the shared HTTP client failed.
    #[error("http client construction failed")]
    HttpClient {
        /// Operation identifier.
        operation: &'static str,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// Binding the webhook listener failed.
    #[error("failed to bind webhook listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Source IO error.
        source: io::Error,
    },
    /// Serving the webhook listener failed.
    #[error("webhook listener terminated unexpectedly")]
    Serve {
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: vigil_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: vigil_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn http_client(operation: &'static str, source: reqwest::Error) -> Self {
        Self::HttpClient { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "settings.from_env",
            vigil_config::ConfigError::MissingEnv {
                name: "VIGIL_SCREENSHOT_KEY",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));

        let config = AppError::config(
            "settings.validate",
            vigil_config::ConfigError::Invalid {
                field: "http_port",
                reason: "zero",
                value: Some("0".to_string()),
            },
        );
        assert!(matches!(config, AppError::Config { .. }));
    }
}
