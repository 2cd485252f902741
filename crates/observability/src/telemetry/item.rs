use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Properties;

/// Common tags stamped on every outbound item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryContext {
    /// Logical service name shown by the monitoring backend.
    pub role_name: String,
    pub environment: String,
    pub version: String,
}

impl TelemetryContext {
    pub fn new(
        role_name: impl Into<String>,
        environment: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            role_name: role_name.into(),
            environment: environment.into(),
            version: version.into(),
        }
    }
}

impl Default for TelemetryContext {
    fn default() -> Self {
        Self::new("catalog-api", "development", env!("CARGO_PKG_VERSION"))
    }
}

/// A single thing worth telling the monitoring backend about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TelemetryItem {
    /// Named business occurrence with context and numeric measurements.
    Event {
        name: String,
        properties: Properties,
        metrics: BTreeMap<String, f64>,
    },
    /// Standalone numeric measurement.
    Metric { name: String, value: f64 },
    /// A failure, flattened to strings so it can outlive the error value.
    Exception {
        #[serde(rename = "typeName")]
        type_name: String,
        message: String,
        causes: Vec<String>,
        properties: Properties,
    },
}

impl TelemetryItem {
    /// Event or metric name; the error kind for exceptions.
    pub fn name(&self) -> &str {
        match self {
            Self::Event { name, .. } | Self::Metric { name, .. } => name,
            Self::Exception { type_name, .. } => type_name,
        }
    }

    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Self::Event { properties, .. } | Self::Exception { properties, .. } => Some(properties),
            Self::Metric { .. } => None,
        }
    }
}

/// What actually goes over the wire: an item plus identity, time and context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEnvelope {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub context: TelemetryContext,
    #[serde(flatten)]
    pub item: TelemetryItem,
}

impl TelemetryEnvelope {
    pub fn new(context: TelemetryContext, item: TelemetryItem) -> Self {
        Self {
            id: Uuid::now_v7(),
            time: Utc::now(),
            context,
            item,
        }
    }
}
