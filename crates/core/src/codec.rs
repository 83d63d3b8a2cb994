//! Wire-level entry points shared by every resource type

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::DecodeError;

/// Parse raw bytes into a JSON value
pub fn parse_json(bytes: &[u8]) -> Result<JsonValue, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize a resource to its canonical JSON wire form.
///
/// Optional fields that are absent and empty lists are omitted. Decimal
/// quantities are written as JSON numbers; converting them to `f64` may lose
/// precision beyond roughly 15 significant digits.
pub fn encode<R: Serialize>(resource: &R) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(resource)
}

/// Treat JSON `null` the same as an absent field
pub(crate) fn present<'a>(
    object: &'a serde_json::Map<String, JsonValue>,
    key: &str,
) -> Option<&'a JsonValue> {
    object.get(key).filter(|v| !v.is_null())
}

/// Require `resourceType` to equal `expected` when it is present
pub(crate) fn check_resource_type(
    object: &serde_json::Map<String, JsonValue>,
    expected: &str,
    required: bool,
) -> Result<(), DecodeError> {
    match present(object, "resourceType") {
        Some(JsonValue::String(found)) if found == expected => Ok(()),
        Some(other) => Err(DecodeError::schema(
            "resourceType",
            format!("expected '{}', got {}", expected, other),
        )),
        None if required => Err(DecodeError::schema(
            "resourceType",
            format!("missing, expected '{}'", expected),
        )),
        None => Ok(()),
    }
}
