pub mod health;
pub mod metrics;
mod observation;
mod patient;

use axum::{
    Router,
    routing::{get, post},
};

use crate::gateway::Gateway;

/// Build the gateway's resource routes
pub fn gateway_routes() -> Router<Gateway> {
    Router::new()
        .route("/", get(home))
        .route("/Patient", post(patient::create))
        .route("/Patient/{id}", get(patient::read))
        .route("/Patient/{id}/Documents", get(patient::documents))
        .route("/observations/{patient_id}", get(observation::search))
        .route("/create_observation", post(observation::create))
}

/// GET / - Liveness greeting
async fn home() -> &'static str {
    "Hello, World!"
}
