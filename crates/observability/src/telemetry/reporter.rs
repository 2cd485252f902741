use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use super::Properties;
use super::client::{TelemetryClient, TracingTelemetry};
use super::item::{TelemetryContext, TelemetryEnvelope, TelemetryItem};

pub const PROCESSING_TIME_METRIC: &str = "processingTimeMs";
pub const RESULT_COUNT_METRIC: &str = "resultCount";

/// Application-facing telemetry API.
///
/// Every method is fire-and-forget: a backend error is logged at `warn` and
/// never returned, so callers cannot have their outcome changed by telemetry.
#[derive(Clone)]
pub struct TelemetryReporter {
    client: Arc<dyn TelemetryClient>,
    context: TelemetryContext,
}

impl core::fmt::Debug for TelemetryReporter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TelemetryReporter")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl TelemetryReporter {
    pub fn new(client: Arc<dyn TelemetryClient>, context: TelemetryContext) -> Self {
        Self { client, context }
    }

    /// Reporter that writes to the `telemetry` log target.
    pub fn tracing(context: TelemetryContext) -> Self {
        Self::new(Arc::new(TracingTelemetry), context)
    }

    pub fn context(&self) -> &TelemetryContext {
        &self.context
    }

    /// Record a named business event.
    ///
    /// `processingTimeMs` is measured from `started` to now; `resultCount` is
    /// attached when supplied.
    pub fn record_event(
        &self,
        name: &str,
        properties: Properties,
        started: Instant,
        result_count: Option<f64>,
    ) {
        let mut metrics = BTreeMap::new();
        metrics.insert(PROCESSING_TIME_METRIC.to_string(), elapsed_ms(started));
        if let Some(count) = result_count {
            metrics.insert(RESULT_COUNT_METRIC.to_string(), count);
        }

        self.send(TelemetryItem::Event {
            name: name.to_string(),
            properties,
            metrics,
        });
    }

    /// Record a standalone measurement.
    pub fn record_metric(&self, name: &str, value: f64) {
        self.send(TelemetryItem::Metric {
            name: name.to_string(),
            value,
        });
    }

    /// Record a failure under `kind` with its message and source chain.
    pub fn record_exception(
        &self,
        kind: &str,
        error: &(dyn std::error::Error + 'static),
        properties: Properties,
    ) {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        self.send(TelemetryItem::Exception {
            type_name: kind.to_string(),
            message: error.to_string(),
            causes,
            properties,
        });
    }

    /// `endpoint = "METHOD path"` plus `entityId` when known.
    pub fn endpoint_properties(method: &str, path: &str, entity_id: Option<&str>) -> Properties {
        let mut properties = Properties::new();
        properties.insert("endpoint".to_string(), format!("{method} {path}"));
        if let Some(id) = entity_id {
            properties.insert("entityId".to_string(), id.to_string());
        }
        properties
    }

    fn send(&self, item: TelemetryItem) {
        let envelope = TelemetryEnvelope::new(self.context.clone(), item);
        tracing::debug!(item = envelope.item.name(), "telemetry item");
        if let Err(e) = self.client.track(&envelope) {
            tracing::warn!(item = envelope.item.name(), error = %e, "telemetry dropped");
        }
    }
}

/// Milliseconds since `started`, as the backend expects them.
pub fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
