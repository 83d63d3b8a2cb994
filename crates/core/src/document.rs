//! Pass-through resources the gateway does not model field by field

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::codec::check_resource_type;
use crate::error::DecodeError;

pub const DOCUMENT_REFERENCE: &str = "DocumentReference";

/// FHIR DocumentReference, carried verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentReference(Map<String, JsonValue>);

impl DocumentReference {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(|v| v.as_str())
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

/// Decode a DocumentReference; only the envelope is checked
pub fn decode_document_reference(raw: &JsonValue) -> Result<DocumentReference, DecodeError> {
    let object = decode_resource_of_type(raw, DOCUMENT_REFERENCE)?;
    Ok(DocumentReference(object.clone()))
}

/// Require `raw` to be a JSON object whose `resourceType` is `expected`
pub fn decode_resource_of_type<'a>(
    raw: &'a JsonValue,
    expected: &str,
) -> Result<&'a Map<String, JsonValue>, DecodeError> {
    let object = raw
        .as_object()
        .ok_or_else(|| DecodeError::schema("$", "expected a JSON object"))?;
    check_resource_type(object, expected, true)?;
    Ok(object)
}
