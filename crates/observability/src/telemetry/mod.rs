//! Business telemetry.
//!
//! [`TelemetryReporter`] is what application code talks to. It stamps every
//! item with a [`TelemetryContext`] and hands it to a [`TelemetryClient`]
//! backend. Reporting is best-effort: a failing backend is logged and
//! otherwise ignored.

pub mod client;
pub mod http;
pub mod item;
pub mod reporter;

pub use client::{InMemoryTelemetry, NoopTelemetry, TelemetryClient, TelemetryError, TracingTelemetry};
pub use http::HttpTelemetry;
pub use item::{TelemetryContext, TelemetryEnvelope, TelemetryItem};
pub use reporter::TelemetryReporter;

/// String-keyed context attached to events and exceptions.
pub type Properties = std::collections::BTreeMap<String, String>;
