use thiserror::Error;

/// Failure turning JSON into a validated resource
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid date in {field}: '{value}' is not a YYYY-MM-DD calendar date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Schema violation at {field}: {reason}")]
    SchemaViolation { field: String, reason: String },

    #[error("Expected a searchset Bundle, got resourceType={resource_type:?} type={bundle_type:?}")]
    NotASearchset {
        resource_type: Option<String>,
        bundle_type: Option<String>,
    },
}

impl DecodeError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure building a resource from caller input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing subject: patient id must not be empty")]
    MissingSubject,

    #[error("Invalid value: '{0}' is not a finite decimal number")]
    InvalidValue(String),
}
