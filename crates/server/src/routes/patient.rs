//! Patient and DocumentReference HTTP handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use fhir_gateway_core::{DocumentReference, Patient};

use crate::error::{AppError, ErrorMessages};
use crate::gateway::Gateway;

const READ_ERRORS: ErrorMessages = ErrorMessages {
    not_found: "Patient not found",
    upstream: "An error occurred when retrieving the patient",
    malformed: "Server response is not a valid Patient resource",
    missing_location: "",
    propagate_upstream_status: true,
};

const CREATE_ERRORS: ErrorMessages = ErrorMessages {
    not_found: "Patient not found",
    upstream: "Failed to create the patient",
    malformed: "Server response is not a valid Patient resource",
    missing_location: "Failed to get the new patient's location",
    propagate_upstream_status: true,
};

const DOCUMENT_ERRORS: ErrorMessages = ErrorMessages {
    not_found: "Patient not found",
    upstream: "An error occurred when retrieving documents",
    malformed: "Server response is not a valid searchset Bundle",
    missing_location: "",
    propagate_upstream_status: true,
};

/// GET /Patient/{id} - Read a patient from the upstream server
pub async fn read(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    gateway
        .fetch_patient(&id)
        .await
        .map(Json)
        .map_err(|e| AppError::from_gateway(e, &READ_ERRORS))
}

/// POST /Patient - Validate and forward a new patient
///
/// Responds 201 with the upstream `Location` both as the JSON body and as
/// the `Location` header.
pub async fn create(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let location = gateway
        .create_patient(&body)
        .await
        .map_err(|e| AppError::from_gateway(e, &CREATE_ERRORS))?;

    tracing::info!(location = %location, "Patient created upstream");

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }

    Ok((StatusCode::CREATED, headers, Json(location)))
}

/// GET /Patient/{id}/Documents - List a patient's DocumentReferences
pub async fn documents(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DocumentReference>>, AppError> {
    gateway
        .fetch_patient_documents(&id)
        .await
        .map(Json)
        .map_err(|e| AppError::from_gateway(e, &DOCUMENT_ERRORS))
}
