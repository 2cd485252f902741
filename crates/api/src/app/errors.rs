//! Domain error to HTTP translation.
//!
//! | DomainError | Status | `error` |
//! |-------------|--------|---------|
//! | `Validation` | 400 | `Validation Error` |
//! | `NotFound` | 404 | `Not Found` |
//! | `BusinessRule` | 409 | `Conflict` |
//! | `Unclassified` | 500 | `Internal Server Error` |

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use catalog_core::DomainError;
use catalog_observability::{Properties, TelemetryReporter};

const UNCLASSIFIED_DETAIL: &str = "An unexpected error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub message: String,
    pub error: String,
    pub error_code: String,
}

/// A failed request, already reported to telemetry.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl ApiError {
    /// Report `error` with the handler's `properties`, then build the response.
    pub fn report(telemetry: &TelemetryReporter, error: DomainError, properties: Properties) -> Self {
        track_failure(telemetry, &error, properties.clone());

        let kind = error.kind();
        let (status, category, detail) = match &error {
            DomainError::Validation(errors) => {
                let mut props = properties;
                props.insert("errorType".to_string(), kind.to_string());
                props.insert("errorCount".to_string(), errors.len().to_string());
                props.insert("fields".to_string(), errors.field_names().join(","));
                telemetry.record_event("RequestValidationFailed", props, Instant::now(), None);
                (StatusCode::BAD_REQUEST, "Validation Error", errors.to_string())
            }
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not Found", error.to_string()),
            DomainError::BusinessRule(msg) => (StatusCode::CONFLICT, "Conflict", msg.clone()),
            DomainError::Unclassified(inner) => {
                tracing::error!(error = ?inner, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    UNCLASSIFIED_DETAIL.to_string(),
                )
            }
        };

        Self {
            status,
            envelope: ErrorEnvelope {
                message: format!("{kind}: {detail}"),
                error: category.to_string(),
                error_code: status.as_u16().to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &ErrorEnvelope {
        &self.envelope
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Record `error` as an exception. The error's own properties are merged
/// under `properties`; caller keys win.
pub fn track_failure(telemetry: &TelemetryReporter, error: &DomainError, properties: Properties) {
    let mut merged = error.properties();
    merged.extend(properties);
    telemetry.record_exception(error.kind(), error, merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use catalog_core::ValidationErrors;
    use catalog_observability::{InMemoryTelemetry, TelemetryContext, TelemetryItem};

    fn reporter() -> (Arc<InMemoryTelemetry>, TelemetryReporter) {
        let sink = Arc::new(InMemoryTelemetry::new());
        let reporter = TelemetryReporter::new(sink.clone(), TelemetryContext::default());
        (sink, reporter)
    }

    fn endpoint() -> Properties {
        TelemetryReporter::endpoint_properties("GET", "/api/products/7", Some("7"))
    }

    #[test]
    fn validation_lists_sorted_fields_and_emits_event() {
        let (sink, telemetry) = reporter();
        let mut errors = ValidationErrors::new();
        errors.add("price", "Price is required");
        errors.add("name", "Product name is required");

        let err = ApiError::report(&telemetry, DomainError::validation(errors), endpoint());

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.envelope(),
            &ErrorEnvelope {
                message: "ValidationError: Validation failed for fields: name, price".to_string(),
                error: "Validation Error".to_string(),
                error_code: "400".to_string(),
            }
        );
        assert_eq!(sink.exception_types(), vec!["ValidationError"]);
        match sink.find("RequestValidationFailed").unwrap() {
            TelemetryItem::Event { properties, .. } => {
                assert_eq!(properties["errorCount"], "2");
                assert_eq!(properties["fields"], "name,price");
                assert_eq!(properties["endpoint"], "GET /api/products/7");
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn not_found_names_the_resource() {
        let (sink, telemetry) = reporter();
        let err = ApiError::report(&telemetry, DomainError::not_found("Product", 7), endpoint());

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.envelope().message, "NotFoundError: Product with ID 7 not found");
        assert_eq!(err.envelope().error, "Not Found");
        assert_eq!(err.envelope().error_code, "404");

        match sink.find("NotFoundError").unwrap() {
            TelemetryItem::Exception { properties, .. } => {
                assert_eq!(properties["resourceType"], "Product");
                assert_eq!(properties["resourceId"], "7");
                assert_eq!(properties["entityId"], "7");
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn business_rule_maps_to_conflict() {
        let (_sink, telemetry) = reporter();
        let err = ApiError::report(
            &telemetry,
            DomainError::business_rule("price locked during promotion"),
            Properties::new(),
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(
            err.envelope().message,
            "BusinessRuleError: price locked during promotion"
        );
        assert_eq!(err.envelope().error, "Conflict");
    }

    #[test]
    fn unclassified_hides_details_but_reports_them() {
        let (sink, telemetry) = reporter();
        let cause = std::io::Error::other("password authentication failed for user catalog");

        let err = ApiError::report(&telemetry, DomainError::unclassified(cause), endpoint());

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.envelope().message,
            "UnclassifiedError: An unexpected error occurred"
        );
        assert_eq!(err.envelope().error, "Internal Server Error");
        assert_eq!(err.envelope().error_code, "500");

        match sink.find("UnclassifiedError").unwrap() {
            TelemetryItem::Exception { message, .. } => {
                assert!(message.contains("password authentication failed"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn caller_properties_win_over_error_properties() {
        let (sink, telemetry) = reporter();
        let mut props = Properties::new();
        props.insert("resourceId".to_string(), "override".to_string());

        track_failure(&telemetry, &DomainError::not_found("Product", 3), props);

        match sink.find("NotFoundError").unwrap() {
            TelemetryItem::Exception { properties, .. } => {
                assert_eq!(properties["resourceId"], "override");
                assert_eq!(properties["resourceType"], "Product");
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }
}
