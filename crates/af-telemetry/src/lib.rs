//! # AF Telemetry
//!
//! Structured logging for aidflow processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use af_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // Spans and events from af-operations are now written to stderr
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `aidflow` | Service name in log lines |
//! | `AF_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `AF_JSON_LOGS` | `false` | JSON output (defaults to true in containers) |
//! | `AF_CONSOLE_OUTPUT` | `true` | Disable to silence console output |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// The log level or filter directive could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Installs the global `tracing` subscriber.
///
/// Returns a guard that should be held for the lifetime of the process.
///
/// # Errors
///
/// Fails if the filter is invalid or a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Opens an `info` span for one operation submission.
///
/// # Example
///
/// ```rust,ignore
/// use af_telemetry::operation_span;
///
/// let span = operation_span!("submit", plan = %plan_id, beneficiary = %beneficiary_id);
/// let _enter = span.enter();
/// ```
#[macro_export]
macro_rules! operation_span {
    ($name:expr) => {
        tracing::info_span!($name, component = "operations")
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, component = "operations", $($field)*)
    };
}
