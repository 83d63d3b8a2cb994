//! Blood glucose Observation builder

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::datatypes::{CodeableConcept, Coding, Quantity, Reference};
use crate::error::BuildError;
use crate::patient::PATIENT;

pub const OBSERVATION: &str = "Observation";

pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const BLOOD_GLUCOSE_CODE: &str = "15074-8";
pub const BLOOD_GLUCOSE_DISPLAY: &str = "Glucose [Moles/volume] in Blood";

pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
pub const MMOL_PER_LITER: &str = "mmol/L";

/// Observation status value set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Corrected,
    Cancelled,
    EnteredInError,
    Unknown,
}

/// FHIR Observation carrying a single quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub resource_type: String,
    pub status: ObservationStatus,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub value_quantity: Quantity,
}

/// Build a final blood glucose Observation (mmol/L) for a patient.
///
/// The LOINC code and unit are fixed; callers only supply the subject and
/// the measured value.
pub fn build_observation(patient_id: &str, value: &str) -> Result<Observation, BuildError> {
    let patient_id = patient_id.trim();
    if patient_id.is_empty() {
        return Err(BuildError::MissingSubject);
    }

    let value = parse_decimal(value)?;

    Ok(Observation {
        resource_type: OBSERVATION.to_string(),
        status: ObservationStatus::Final,
        code: CodeableConcept {
            coding: vec![Coding {
                system: LOINC_SYSTEM.to_string(),
                code: BLOOD_GLUCOSE_CODE.to_string(),
                display: Some(BLOOD_GLUCOSE_DISPLAY.to_string()),
            }],
        },
        subject: Reference::to(PATIENT, patient_id),
        value_quantity: Quantity {
            value,
            unit: MMOL_PER_LITER.to_string(),
            system: UCUM_SYSTEM.to_string(),
            code: MMOL_PER_LITER.to_string(),
        },
    })
}

fn parse_decimal(raw: &str) -> Result<Decimal, BuildError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BuildError::InvalidValue(raw.to_string()));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| BuildError::InvalidValue(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use serde_json::{Value as JsonValue, json};

    #[test]
    fn test_build_blood_glucose() {
        let observation = build_observation("42", "5.5").unwrap();
        assert_eq!(observation.status, ObservationStatus::Final);
        assert_eq!(observation.code.coding[0].system, LOINC_SYSTEM);
        assert_eq!(observation.code.coding[0].code, "15074-8");
        assert_eq!(observation.subject.reference, "Patient/42");
        assert_eq!(observation.value_quantity.value, Decimal::from_str("5.5").unwrap());
        assert_eq!(observation.value_quantity.unit, "mmol/L");
    }

    #[test]
    fn test_encoded_observation_shape() {
        let observation = build_observation("42", "5.5").unwrap();
        let json: JsonValue = serde_json::from_slice(&encode(&observation).unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "resourceType": "Observation",
                "status": "final",
                "code": {"coding": [{
                    "system": "http://loinc.org",
                    "code": "15074-8",
                    "display": "Glucose [Moles/volume] in Blood"
                }]},
                "subject": {"reference": "Patient/42"},
                "valueQuantity": {
                    "value": 5.5,
                    "unit": "mmol/L",
                    "system": "http://unitsofmeasure.org",
                    "code": "mmol/L"
                }
            })
        );
    }

    #[test]
    fn test_invalid_values() {
        for bad in ["not-a-number", "", "   ", "NaN", "inf", "5,5"] {
            assert_eq!(
                build_observation("42", bad),
                Err(BuildError::InvalidValue(bad.to_string())),
                "value {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_scientific_notation_accepted() {
        let observation = build_observation("42", "6.1e0").unwrap();
        assert_eq!(observation.value_quantity.value, Decimal::from_str("6.1").unwrap());
    }

    #[test]
    fn test_missing_subject() {
        assert_eq!(build_observation("", "5.5"), Err(BuildError::MissingSubject));
        assert_eq!(build_observation("  ", "5.5"), Err(BuildError::MissingSubject));
    }
}
