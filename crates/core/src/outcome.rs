//! Reader for OperationOutcome bodies returned by the upstream on failure.
//!
//! Only used to enrich log lines; a body that does not parse is ignored.

use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// FHIR OperationOutcome (only the parts worth logging)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

/// A single issue in an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Parse an upstream response body, if it is an OperationOutcome
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .filter(|outcome| outcome.resource_type == "OperationOutcome")
    }

    /// One-line summary of the issues, e.g. `error/not-found: Patient 42 is gone`
    pub fn summary(&self) -> String {
        self.issue
            .iter()
            .map(|issue| {
                let severity = serde_json::to_value(issue.severity)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                match &issue.diagnostics {
                    Some(diagnostics) => format!("{}/{}: {}", severity, issue.code, diagnostics),
                    None => format!("{}/{}", severity, issue.code),
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
