//! Patient projection and its decoder

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::codec::{check_resource_type, present};
use crate::datatypes::{AdministrativeGender, HumanName, Identifier};
use crate::error::DecodeError;

pub const PATIENT: &str = "Patient";

/// FHIR Patient, limited to the fields the gateway reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,
}

/// Decode a Patient from loosely-typed JSON.
///
/// Unknown fields are ignored and `null` counts as absent. A present
/// `resourceType` must be `Patient`.
pub fn decode_patient(raw: &JsonValue) -> Result<Patient, DecodeError> {
    let object = raw
        .as_object()
        .ok_or_else(|| DecodeError::schema("$", "expected a JSON object"))?;

    check_resource_type(object, PATIENT, false)?;

    let id = match present(object, "id") {
        None => None,
        Some(JsonValue::String(id)) => Some(id.clone()),
        Some(other) => {
            return Err(DecodeError::schema(
                "id",
                format!("expected a string, got {}", other),
            ));
        }
    };

    let birth_date = match present(object, "birthDate") {
        None => None,
        Some(JsonValue::String(value)) => Some(parse_date("birthDate", value)?),
        Some(other) => {
            return Err(DecodeError::InvalidDate {
                field: "birthDate",
                value: other.to_string(),
            });
        }
    };

    let gender = present(object, "gender")
        .map(|value| {
            serde_json::from_value::<AdministrativeGender>(value.clone()).map_err(|_| {
                DecodeError::schema(
                    "gender",
                    format!("expected one of male, female, other, unknown; got {}", value),
                )
            })
        })
        .transpose()?;

    Ok(Patient {
        resource_type: PATIENT.to_string(),
        id,
        identifier: decode_list(object, "identifier")?,
        name: decode_list(object, "name")?,
        birth_date,
        gender,
    })
}

/// Decode an optional array field into typed elements, skipping `null` elements
fn decode_list<T: DeserializeOwned>(
    object: &Map<String, JsonValue>,
    field: &str,
) -> Result<Vec<T>, DecodeError> {
    match present(object, field) {
        None => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(i, item)| {
                serde_json::from_value(item.clone())
                    .map_err(|e| DecodeError::schema(format!("{}[{}]", field, i), e.to_string()))
            })
            .collect(),
        Some(other) => Err(DecodeError::schema(
            field,
            format!("expected an array, got {}", other),
        )),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DecodeError> {
    let invalid = || DecodeError::InvalidDate {
        field,
        value: value.to_string(),
    };

    // chrono tolerates single-digit months and days; FHIR dates do not
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use serde_json::json;

    fn sample() -> JsonValue {
        json!({
            "resourceType": "Patient",
            "id": "42",
            "identifier": [{"use": "official", "system": "http://hospital.example.org", "value": "123456"}],
            "name": [{"family": "Doe", "given": ["John", "Q"]}],
            "birthDate": "2000-01-01",
            "gender": "male"
        })
    }

    #[test]
    fn test_decode_full_patient() {
        let patient = decode_patient(&sample()).unwrap();
        assert_eq!(patient.id.as_deref(), Some("42"));
        assert_eq!(patient.identifier[0].value.as_deref(), Some("123456"));
        assert_eq!(patient.name[0].given, vec!["John", "Q"]);
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(patient.gender, Some(AdministrativeGender::Male));
    }

    #[test]
    fn test_round_trip_preserves_populated_fields() {
        let raw = sample();
        let patient = decode_patient(&raw).unwrap();
        let encoded: JsonValue = serde_json::from_slice(&encode(&patient).unwrap()).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn test_round_trip_minimal_patient() {
        let raw = json!({"resourceType": "Patient", "name": [{"family": "Solo"}]});
        let patient = decode_patient(&raw).unwrap();
        let encoded: JsonValue = serde_json::from_slice(&encode(&patient).unwrap()).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = json!({"name": [{"family": "Doe", "prefix": ["Mr"]}], "telecom": []});
        let patient = decode_patient(&raw).unwrap();
        assert_eq!(patient.resource_type, "Patient");
        assert_eq!(patient.name[0].family.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_missing_gender_is_absent() {
        let patient = decode_patient(&json!({"birthDate": "1990-05-15"})).unwrap();
        assert!(patient.gender.is_none());

        let patient = decode_patient(&json!({"gender": null})).unwrap();
        assert!(patient.gender.is_none());
    }

    #[test]
    fn test_nested_nulls_are_absent() {
        let raw = json!({
            "identifier": [null, {"use": null, "value": "123456"}],
            "name": [{"family": "Doe", "given": null}, null]
        });
        let patient = decode_patient(&raw).unwrap();
        assert_eq!(patient.identifier.len(), 1);
        assert!(patient.identifier[0].use_.is_none());
        assert_eq!(patient.name.len(), 1);
        assert!(patient.name[0].given.is_empty());
    }

    #[test]
    fn test_invalid_birth_date() {
        for bad in [json!("2000-13-01"), json!("01/02/2000"), json!("2000-1-1"), json!(20000101)] {
            let err = decode_patient(&json!({"birthDate": bad})).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidDate { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_schema_violations() {
        let cases = [
            json!([]),
            json!({"resourceType": "Observation"}),
            json!({"name": {"family": "Doe"}}),
            json!({"name": [{"given": "John"}]}),
            json!({"identifier": [{"value": 123}]}),
            json!({"identifier": "123"}),
            json!({"gender": "M"}),
            json!({"id": 7}),
        ];
        for raw in cases {
            let err = decode_patient(&raw).unwrap_err();
            assert!(matches!(err, DecodeError::SchemaViolation { .. }), "{} -> {:?}", raw, err);
        }
    }
}
