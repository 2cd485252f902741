//! Domain error model.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Per-field validation failures.
///
/// `fields` maps a field name to a human-readable message. `context` carries
/// extra key/value pairs worth reporting alongside the failure (for example the
/// rejected value), and is never shown to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
    context: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failure for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise a [`DomainError::Validation`].
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for fields: {}", self.field_names().join(", "))
    }
}

/// Domain-level error.
///
/// Closed set of failure kinds an operation can raise. The HTTP layer matches
/// on it exhaustively to pick a status code and envelope.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller input was malformed.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The referenced resource does not exist.
    #[error("{resource_type} with ID {resource_id} not found")]
    NotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// A business rule rejected the request.
    #[error("{0}")]
    BusinessRule(String),

    /// Anything else, including storage failures.
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn not_found(resource_type: &'static str, resource_id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource_type,
            resource_id: resource_id.to_string(),
        }
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn unclassified<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unclassified(anyhow::Error::new(err))
    }

    /// Stable label for the error kind, used in telemetry and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::BusinessRule(_) => "BusinessRuleError",
            Self::Unclassified(_) => "UnclassifiedError",
        }
    }

    /// Context properties describing this failure.
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        match self {
            Self::Validation(errors) => {
                props.insert("fields".to_string(), errors.field_names().join(","));
                for (field, message) in errors.fields() {
                    props.insert(format!("validationError.{field}"), message.clone());
                }
                props.extend(errors.context().clone());
            }
            Self::NotFound {
                resource_type,
                resource_id,
            } => {
                props.insert("resourceType".to_string(), (*resource_type).to_string());
                props.insert("resourceId".to_string(), resource_id.clone());
            }
            Self::BusinessRule(_) => {
                props.insert("businessRule".to_string(), "violated".to_string());
            }
            Self::Unclassified(err) => {
                props.insert("cause".to_string(), err.root_cause().to_string());
            }
        }
        props
    }
}
