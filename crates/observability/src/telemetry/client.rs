use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use super::item::{TelemetryEnvelope, TelemetryItem};

/// Why a backend could not accept an item.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry backend requires a tokio runtime")]
    NoRuntime,

    #[error("telemetry transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A monitoring backend.
///
/// Implementations must not block on network IO inside `track`; anything slow
/// is handed off (see [`super::HttpTelemetry`]).
pub trait TelemetryClient: Send + Sync {
    fn track(&self, envelope: &TelemetryEnvelope) -> Result<(), TelemetryError>;
}

/// Emits every item as a structured `tracing` event on the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetryClient for TracingTelemetry {
    fn track(&self, envelope: &TelemetryEnvelope) -> Result<(), TelemetryError> {
        let role = envelope.context.role_name.as_str();
        match &envelope.item {
            TelemetryItem::Event {
                name,
                properties,
                metrics,
            } => tracing::info!(
                target: "telemetry",
                kind = "event",
                role,
                name = name.as_str(),
                properties = ?properties,
                metrics = ?metrics
            ),
            TelemetryItem::Metric { name, value } => tracing::info!(
                target: "telemetry",
                kind = "metric",
                role,
                name = name.as_str(),
                value
            ),
            TelemetryItem::Exception {
                type_name,
                message,
                causes,
                properties,
            } => tracing::warn!(
                target: "telemetry",
                kind = "exception",
                role,
                type_name = type_name.as_str(),
                message = message.as_str(),
                causes = ?causes,
                properties = ?properties
            ),
        }
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetryClient for NoopTelemetry {
    fn track(&self, _envelope: &TelemetryEnvelope) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Keeps every item in memory, in order. For tests and local inspection.
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    items: Mutex<Vec<TelemetryEnvelope>>,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn envelopes(&self) -> Vec<TelemetryEnvelope> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn items(&self) -> Vec<TelemetryItem> {
        self.envelopes().into_iter().map(|e| e.item).collect()
    }

    /// Names of recorded events (not metrics or exceptions), in order.
    pub fn event_names(&self) -> Vec<String> {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                TelemetryItem::Event { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Type names of recorded exceptions, in order.
    pub fn exception_types(&self) -> Vec<String> {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                TelemetryItem::Exception { type_name, .. } => Some(type_name),
                _ => None,
            })
            .collect()
    }

    /// First recorded item with the given name.
    pub fn find(&self, name: &str) -> Option<TelemetryItem> {
        self.items().into_iter().find(|item| item.name() == name)
    }

    pub fn clear(&self) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl TelemetryClient for InMemoryTelemetry {
    fn track(&self, envelope: &TelemetryEnvelope) -> Result<(), TelemetryError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());
        Ok(())
    }
}
