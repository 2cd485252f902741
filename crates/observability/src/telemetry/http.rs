use std::time::Duration;

use super::client::{TelemetryClient, TelemetryError};
use super::item::TelemetryEnvelope;

const INSTRUMENTATION_KEY_HEADER: &str = "x-instrumentation-key";

/// Ships items as JSON to an HTTP ingestion endpoint.
///
/// Each `track` call spawns the POST on the current tokio runtime and returns
/// immediately; delivery failures are logged from the spawned task.
#[derive(Debug, Clone)]
pub struct HttpTelemetry {
    client: reqwest::Client,
    endpoint: String,
    instrumentation_key: Option<String>,
}

impl HttpTelemetry {
    pub fn new(
        endpoint: impl Into<String>,
        instrumentation_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            instrumentation_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TelemetryClient for HttpTelemetry {
    fn track(&self, envelope: &TelemetryEnvelope) -> Result<(), TelemetryError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?;

        let mut request = self.client.post(&self.endpoint).json(envelope);
        if let Some(key) = &self.instrumentation_key {
            request = request.header(INSTRUMENTATION_KEY_HEADER, key);
        }

        let name = envelope.item.name().to_string();
        runtime.spawn(async move {
            match request.send().await {
                Ok(res) if res.status().is_success() => {}
                Ok(res) => tracing::warn!(
                    item = name.as_str(),
                    status = %res.status(),
                    "telemetry endpoint rejected item"
                ),
                Err(e) => tracing::warn!(item = name.as_str(), error = %e, "telemetry delivery failed"),
            }
        });

        Ok(())
    }
}
