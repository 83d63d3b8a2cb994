use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::codec::present;
use crate::error::DecodeError;

pub const BUNDLE: &str = "Bundle";

/// FHIR Bundle types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

/// Unpack the resources of a searchset Bundle.
///
/// The envelope (`resourceType` and `type`) is checked before any entry is
/// looked at. Every `entry[i].resource` is then passed to `decode`; the first
/// failing entry fails the whole call, so callers never see a partial list.
pub fn decode_bundle_entries<T, F>(raw: &JsonValue, decode: F) -> Result<Vec<T>, DecodeError>
where
    F: Fn(&JsonValue) -> Result<T, DecodeError>,
{
    let object = check_searchset(raw)?;

    let entries = match present(object, "entry") {
        None => return Ok(Vec::new()),
        Some(JsonValue::Array(entries)) => entries,
        Some(other) => {
            return Err(DecodeError::schema(
                "entry",
                format!("expected an array, got {}", other),
            ));
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let resource = entry
                .get("resource")
                .filter(|r| !r.is_null())
                .ok_or_else(|| DecodeError::schema(format!("entry[{}].resource", i), "missing"))?;
            decode(resource).map_err(|e| match e {
                DecodeError::SchemaViolation { field, reason } => DecodeError::SchemaViolation {
                    field: format!("entry[{}].resource.{}", i, field),
                    reason,
                },
                other => other,
            })
        })
        .collect()
}

fn check_searchset(raw: &JsonValue) -> Result<&serde_json::Map<String, JsonValue>, DecodeError> {
    let resource_type = raw.get("resourceType").and_then(|v| v.as_str());
    let bundle_type = raw.get("type").and_then(|v| v.as_str());

    let parsed_type = bundle_type
        .and_then(|t| serde_json::from_value::<BundleType>(JsonValue::from(t)).ok());

    match (raw.as_object(), resource_type, parsed_type) {
        (Some(object), Some(BUNDLE), Some(BundleType::Searchset)) => Ok(object),
        _ => Err(DecodeError::NotASearchset {
            resource_type: resource_type.map(str::to_string),
            bundle_type: bundle_type.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{decode_document_reference, decode_resource_of_type};
    use serde_json::json;

    fn searchset(entries: JsonValue) -> JsonValue {
        json!({"resourceType": "Bundle", "type": "searchset", "total": 2, "entry": entries})
    }

    #[test]
    fn test_decodes_entries_in_order() {
        let raw = searchset(json!([
            {"fullUrl": "DocumentReference/a", "resource": {"resourceType": "DocumentReference", "id": "a"}},
            {"fullUrl": "DocumentReference/b", "resource": {"resourceType": "DocumentReference", "id": "b"}}
        ]));
        let documents = decode_bundle_entries(&raw, decode_document_reference).unwrap();
        let ids: Vec<_> = documents.iter().map(|d| d.id().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_searchset() {
        let raw = json!({"resourceType": "Bundle", "type": "searchset", "total": 0});
        let documents = decode_bundle_entries(&raw, decode_document_reference).unwrap();
        assert!(documents.is_empty());

        let raw = searchset(json!([]));
        assert!(decode_bundle_entries(&raw, decode_document_reference).unwrap().is_empty());
    }

    #[test]
    fn test_non_searchset_rejected_before_entries() {
        let calls = std::cell::Cell::new(0);
        let decoder = |_: &JsonValue| -> Result<(), DecodeError> {
            calls.set(calls.get() + 1);
            Ok(())
        };

        for raw in [
            json!({"resourceType": "Bundle", "type": "collection", "entry": [{"resource": {}}]}),
            json!({"resourceType": "Bundle", "entry": [{"resource": {}}]}),
            json!({"resourceType": "Patient", "type": "searchset"}),
            json!([]),
        ] {
            let err = decode_bundle_entries(&raw, decoder).unwrap_err();
            assert!(matches!(err, DecodeError::NotASearchset { .. }), "{:?}", err);
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_one_bad_entry_fails_whole_bundle() {
        let raw = searchset(json!([
            {"resource": {"resourceType": "DocumentReference", "id": "a"}},
            {"resource": {"resourceType": "OperationOutcome"}}
        ]));
        let err = decode_bundle_entries(&raw, decode_document_reference).unwrap_err();
        match err {
            DecodeError::SchemaViolation { field, .. } => {
                assert_eq!(field, "entry[1].resource.resourceType")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_entry_without_resource() {
        let raw = searchset(json!([{"fullUrl": "x"}]));
        let err = decode_bundle_entries(&raw, |r| decode_resource_of_type(r, "Observation").map(|_| ()))
            .unwrap_err();
        assert!(matches!(err, DecodeError::SchemaViolation { .. }));
    }

    #[test]
    fn test_bundle_type_codes() {
        let ty: BundleType = serde_json::from_value(json!("transaction-response")).unwrap();
        assert_eq!(ty, BundleType::TransactionResponse);
    }
}
