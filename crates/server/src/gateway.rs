//! Gateway operations
//!
//! Each operation is one linear pipeline: validate and encode the caller's
//! input, make a single upstream call, classify the status, then decode the
//! body. Nothing is shared between calls except the upstream client.

use axum::http::{StatusCode, header};
use fhir_gateway_core::{
    DecodeError, DocumentReference, OperationOutcome, Patient, build_observation,
    decode_bundle_entries, decode_document_reference, decode_patient, decode_resource_of_type,
    encode, parse_json,
};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::upstream::{FHIR_JSON, TransportError, UpstreamClient, UpstreamResponse};

/// Longest id the FHIR `id` datatype allows
const MAX_ID_LEN: usize = 64;

/// Outcome of a failed gateway operation
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    ClientError(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] TransportError),

    #[error("Resource not found upstream: {0}")]
    ResourceNotFound(String),

    #[error("Upstream responded with status {status}")]
    UpstreamError { status: StatusCode },

    #[error("Upstream created the resource but sent no Location header")]
    MissingLocation,

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(#[source] DecodeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The five gateway operations, bound to one upstream server
#[derive(Clone)]
pub struct Gateway {
    upstream: UpstreamClient,
}

impl Gateway {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// GET /Patient/{id}
    pub async fn fetch_patient(&self, id: &str) -> Result<Patient, GatewayError> {
        let id = validate_id(id)?;
        let response = self.upstream.get(&format!("/Patient/{}", id), &[]).await?;

        if response.status == StatusCode::NOT_FOUND {
            tracing::info!(patient_id = id, "Patient not found upstream");
            return Err(GatewayError::ResourceNotFound(format!("Patient/{}", id)));
        }
        expect_status(&response, StatusCode::OK)?;

        decode_body(&response, decode_patient)
    }

    /// Validate `raw_body` as a Patient and POST it; returns the Location
    pub async fn create_patient(&self, raw_body: &[u8]) -> Result<String, GatewayError> {
        let patient = parse_json(raw_body)
            .and_then(|raw| decode_patient(&raw))
            .map_err(|e| GatewayError::ClientError(e.to_string()))?;

        // the server assigns ids on create
        let patient = Patient { id: None, ..patient };

        let body = encode(&patient).map_err(|e| GatewayError::Internal(e.to_string()))?;
        let response = self.upstream.post("/Patient", body, FHIR_JSON).await?;

        expect_status(&response, StatusCode::CREATED)?;
        location(&response)
    }

    /// GET /DocumentReference?patient={id}, unpacked into a flat list
    pub async fn fetch_patient_documents(
        &self,
        id: &str,
    ) -> Result<Vec<DocumentReference>, GatewayError> {
        let id = validate_id(id)?;
        let response = self
            .upstream
            .get("/DocumentReference", &[("patient", id)])
            .await?;

        expect_status(&response, StatusCode::OK)?;

        decode_body(&response, |raw| {
            decode_bundle_entries(raw, decode_document_reference)
        })
    }

    /// GET /Observation?subject=Patient/{id}; the Bundle is returned as
    /// received once its envelope and entry types have been checked
    pub async fn fetch_observations(&self, patient_id: &str) -> Result<JsonValue, GatewayError> {
        let patient_id = validate_id(patient_id)?;
        let subject = format!("Patient/{}", patient_id);
        let response = self
            .upstream
            .get("/Observation", &[("subject", subject.as_str())])
            .await?;

        expect_status(&response, StatusCode::OK)?;

        decode_body(&response, |raw| {
            decode_bundle_entries(raw, |resource| {
                decode_resource_of_type(resource, "Observation").map(|_| ())
            })?;
            Ok(raw.clone())
        })
    }

    /// Build a blood glucose Observation and POST it; returns the Location
    pub async fn create_observation(
        &self,
        patient_id: &str,
        value: &str,
    ) -> Result<String, GatewayError> {
        let observation = build_observation(patient_id, value)
            .map_err(|e| GatewayError::ClientError(e.to_string()))?;
        validate_id(patient_id.trim())?;

        let body = encode(&observation).map_err(|e| GatewayError::Internal(e.to_string()))?;
        let response = self.upstream.post("/Observation", body, FHIR_JSON).await?;

        expect_status(&response, StatusCode::CREATED)?;
        location(&response)
    }

    /// Status of the upstream capability statement endpoint
    pub async fn upstream_status(&self) -> Result<StatusCode, TransportError> {
        let response = self.upstream.get("/metadata", &[]).await?;
        Ok(response.status)
    }
}

/// Accept only ids matching the FHIR `id` datatype
fn validate_id(id: &str) -> Result<&str, GatewayError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        // dot-only ids are path segments ("." / "..") once placed in a URL
        && !id.chars().all(|c| c == '.');

    if valid {
        Ok(id)
    } else {
        Err(GatewayError::ClientError(format!(
            "'{}' is not a valid resource id",
            id
        )))
    }
}

fn expect_status(response: &UpstreamResponse, expected: StatusCode) -> Result<(), GatewayError> {
    if response.status == expected {
        return Ok(());
    }

    let diagnostics = OperationOutcome::from_body(&response.body).map(|o| o.summary());
    tracing::warn!(
        status = %response.status,
        expected = %expected,
        diagnostics = diagnostics.as_deref().unwrap_or("-"),
        "Unexpected upstream status"
    );
    Err(GatewayError::UpstreamError {
        status: response.status,
    })
}

fn decode_body<T>(
    response: &UpstreamResponse,
    decode: impl FnOnce(&JsonValue) -> Result<T, DecodeError>,
) -> Result<T, GatewayError> {
    parse_json(&response.body)
        .and_then(|raw| decode(&raw))
        .map_err(|e| {
            tracing::error!(error = %e, "Upstream returned success with an unusable body");
            GatewayError::MalformedResponse(e)
        })
}

fn location(response: &UpstreamResponse) -> Result<String, GatewayError> {
    match response.header(header::LOCATION).map(str::trim) {
        Some(location) if !location.is_empty() => Ok(location.to_string()),
        _ => {
            tracing::error!(status = %response.status, "Upstream create response has no Location");
            Err(GatewayError::MissingLocation)
        }
    }
}
