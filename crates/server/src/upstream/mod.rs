//! Access to the upstream FHIR server

pub mod client;

pub use client::{FHIR_JSON, TransportError, UpstreamClient, UpstreamResponse};
