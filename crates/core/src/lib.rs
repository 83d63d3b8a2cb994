//! fhir-gateway-core: FHIR resource codec for the gateway
//!
//! Builds and validates the FHIR resources the gateway sends upstream
//! (Patient, Observation) and decodes what comes back (Patient,
//! DocumentReference, searchset Bundles). Pure, no I/O.

pub mod bundle;
pub mod codec;
pub mod datatypes;
pub mod document;
pub mod error;
pub mod observation;
pub mod outcome;
pub mod patient;

pub use bundle::{BundleType, decode_bundle_entries};
pub use codec::{encode, parse_json};
pub use datatypes::{
    AdministrativeGender, CodeableConcept, Coding, HumanName, Identifier, Quantity, Reference,
};
pub use document::{DocumentReference, decode_document_reference, decode_resource_of_type};
pub use error::{BuildError, DecodeError};
pub use observation::{Observation, ObservationStatus, build_observation};
pub use outcome::{IssueSeverity, OperationOutcome, OperationOutcomeIssue};
pub use patient::{Patient, decode_patient};
