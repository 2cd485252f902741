//! Tracing, logging and business telemetry (shared setup).

/// Initialize process-wide logging.
///
/// Output format comes from `LOG_FORMAT` (`json` or `pretty`), filtering from
/// `RUST_LOG`. Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    logging::init(logging::LogFormat::from_env());
}

/// Subscriber configuration (filters, formats).
pub mod logging;

/// Business telemetry: events, metrics and exceptions sent to a monitoring backend.
pub mod telemetry;

pub use telemetry::{
    HttpTelemetry, InMemoryTelemetry, NoopTelemetry, Properties, TelemetryClient, TelemetryContext,
    TelemetryEnvelope, TelemetryError, TelemetryItem, TelemetryReporter, TracingTelemetry,
};
