//! FHIR complex datatypes used by the gateway's resource projections.
//!
//! These are value objects with no identity of their own; each one is owned
//! by the resource that contains it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// FHIR Identifier (business identifier such as an MRN)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// FHIR HumanName, reduced to family and ordered given names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_tolerant_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub given: Vec<String>,
}

/// Read an optional list whose `null` elements (or `null` itself) mean absent
fn null_tolerant_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<Option<T>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}

/// Administrative gender value set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

/// A single code from a terminology system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Concept expressed as one or more codings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
}

/// Measured amount. `value` is kept as an exact decimal and written to the
/// wire as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub unit: String,
    pub system: String,
    pub code: String,
}

/// Literal reference to another resource, e.g. `Patient/42`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Build a `{type}/{id}` reference
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: format!("{}/{}", resource_type, id),
        }
    }
}
