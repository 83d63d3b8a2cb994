//! Observation HTTP handlers

use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::error::{AppError, ErrorMessages};
use crate::gateway::Gateway;

const SEARCH_ERRORS: ErrorMessages = ErrorMessages {
    not_found: "Observations not found",
    upstream: "An error occurred when retrieving observations",
    malformed: "Server response is not a valid searchset Bundle",
    missing_location: "",
    propagate_upstream_status: true,
};

const CREATE_ERRORS: ErrorMessages = ErrorMessages {
    not_found: "Patient not found",
    upstream: "Failed to create the observation",
    malformed: "Server response is not a valid Observation",
    missing_location: "Failed to get the new observation's id",
    propagate_upstream_status: false,
};

/// Form fields for a new blood glucose reading
#[derive(Debug, Deserialize)]
pub struct ObservationForm {
    #[serde(default)]
    patient_id: String,
    #[serde(default)]
    value: String,
}

/// GET /observations/{patient_id} - Search a patient's observations
pub async fn search(
    State(gateway): State<Gateway>,
    Path(patient_id): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    gateway
        .fetch_observations(&patient_id)
        .await
        .map(Json)
        .map_err(|e| AppError::from_gateway(e, &SEARCH_ERRORS))
}

/// POST /create_observation - Record a blood glucose value for a patient
pub async fn create(
    State(gateway): State<Gateway>,
    form: Result<Form<ObservationForm>, FormRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let location = gateway
        .create_observation(&form.patient_id, &form.value)
        .await
        .map_err(|e| AppError::from_gateway(e, &CREATE_ERRORS))?;

    tracing::info!(location = %location, "Observation created upstream");

    Ok((StatusCode::CREATED, Json(json!({ "id": location }))))
}
