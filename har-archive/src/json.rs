//! JSON model of one header array inside a `.harx` archive.
//!
//! One JSON object per array, PascalCase field names:
//!
//! ```json
//! {
//!   "Header": "VAL1",
//!   "Description": "basic values",
//!   "Type": "RE",
//!   "Dimensions": [2, 2, 1, 1, 1, 1, 1],
//!   "Sets": [{"Key": "COM", "Value": ["c1", "c2"]}, ...],
//!   "SerializedVectors": 1,
//!   "Entries": {"[c1][r1]": 1.0, ...}
//! }
//! ```
//!
//! `Entries` holds only stored (non-default) values, keyed by the
//! canonical key-sequence string, in insertion order.

use har_core::{
    ArrayKind, HarError, HeaderArray, HeaderArrayPayload, KeySequence, Result,
    SequenceDictionary, SetDefinition,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `{Key, Value}` pair of the `Sets` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarxSet {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: Vec<String>,
}

/// Serialized form of one header array.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HarxArray {
    pub header: String,
    pub description: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub dimensions: Vec<i32>,
    pub sets: Vec<HarxSet>,
    pub serialized_vectors: i32,
    pub entries: Map<String, Value>,
}

impl From<&HeaderArray> for HarxArray {
    fn from(array: &HeaderArray) -> Self {
        let mut entries = Map::new();
        match array.payload() {
            HeaderArrayPayload::Strings(dict) => {
                for (key, value) in dict.stored_entries() {
                    entries.insert(key.to_string(), Value::String(value.clone()));
                }
            }
            HeaderArrayPayload::Reals(dict) => {
                for (key, value) in dict.stored_entries() {
                    entries.insert(key.to_string(), json_real(*value));
                }
            }
            HeaderArrayPayload::Ints(dict) => {
                for (key, value) in dict.stored_entries() {
                    entries.insert(key.to_string(), Value::from(*value));
                }
            }
        }
        Self {
            header: array.header().to_string(),
            description: array.description().to_string(),
            kind: array.kind().code().to_string(),
            dimensions: array.dimensions().to_vec(),
            sets: array
                .sets()
                .iter()
                .map(|set| HarxSet {
                    key: set.name().to_string(),
                    value: set.elements().iter().map(|e| e.to_string()).collect(),
                })
                .collect(),
            serialized_vectors: array.serialized_vectors(),
            entries,
        }
    }
}

impl TryFrom<HarxArray> for HeaderArray {
    type Error = HarError;

    fn try_from(model: HarxArray) -> Result<HeaderArray> {
        let kind = ArrayKind::from_code(&model.kind).ok_or_else(|| {
            HarError::invalid_data(format!("unknown array type code {:?}", model.kind))
        })?;
        let sets: Vec<SetDefinition> = model
            .sets
            .into_iter()
            .map(|set| SetDefinition::new(set.key, set.value))
            .collect();

        let payload = match kind {
            ArrayKind::Character => {
                let mut dict = SequenceDictionary::new(sets);
                for (key, value) in model.entries {
                    let text = value.as_str().ok_or_else(|| entry_type_error(&key, "string"))?;
                    dict.insert(KeySequence::parse(&key), text.to_string())?;
                }
                HeaderArrayPayload::Strings(dict)
            }
            ArrayKind::Integer => {
                let mut dict = SequenceDictionary::new(sets);
                for (key, value) in model.entries {
                    let number =
                        value.as_i64().ok_or_else(|| entry_type_error(&key, "integer"))?;
                    dict.insert(KeySequence::parse(&key), number as i32)?;
                }
                HeaderArrayPayload::Ints(dict)
            }
            ArrayKind::Real | ArrayKind::RealList | ArrayKind::RealNoSets => {
                let mut dict = SequenceDictionary::new(sets);
                for (key, value) in model.entries {
                    let number =
                        value.as_f64().ok_or_else(|| entry_type_error(&key, "number"))?;
                    dict.insert(KeySequence::parse(&key), number as f32)?;
                }
                HeaderArrayPayload::Reals(dict)
            }
        };

        HeaderArray::new(
            model.header,
            model.description,
            kind,
            model.dimensions.as_slice(),
            model.serialized_vectors,
            payload,
        )
    }
}

/// Reals serialize through `f64`; the widening is exact, so the narrowing
/// on read recovers the original `f32`.
fn json_real(value: f32) -> Value {
    serde_json::Number::from_f64(value as f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn entry_type_error(key: &str, expected: &str) -> HarError {
    HarError::invalid_data(format!("entry {key:?} is not a JSON {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_two_by_two() -> HeaderArray {
        let sets = vec![
            SetDefinition::new("COM", ["c1", "c2"]),
            SetDefinition::new("REG", ["r1", "r2"]),
        ];
        let dict =
            SequenceDictionary::from_logical_values(sets, [1.0f32, 2.0, 3.0, 4.0]).unwrap();
        HeaderArray::new(
            "VAL1",
            "basic values",
            ArrayKind::Real,
            [2, 2],
            1,
            HeaderArrayPayload::Reals(dict),
        )
        .unwrap()
    }

    #[test]
    fn test_model_round_trip_real() {
        let array = dense_two_by_two();
        let model = HarxArray::from(&array);
        assert_eq!(model.kind, "RE");
        assert_eq!(model.dimensions, vec![2, 2, 1, 1, 1, 1, 1]);
        assert_eq!(model.entries.len(), 4);

        let back = HeaderArray::try_from(model).unwrap();
        assert_eq!(back.header(), "VAL1");
        assert_eq!(back.real(&["c2", "r1"]), Some(2.0));
        assert_eq!(back.sets(), array.sets());
    }

    #[test]
    fn test_model_preserves_named_sets_for_strings() {
        let sets = vec![SetDefinition::new("REG", ["AUS", "USA", "CHN"])];
        let dict = SequenceDictionary::from_logical_values(
            sets,
            ["Oz".to_string(), "States".to_string(), "China".to_string()],
        )
        .unwrap();
        let array = HeaderArray::new(
            "REG1",
            "",
            ArrayKind::Character,
            [3],
            1,
            HeaderArrayPayload::Strings(dict),
        )
        .unwrap();

        let back = HeaderArray::try_from(HarxArray::from(&array)).unwrap();
        assert_eq!(back.string(&["AUS"]), Some("Oz".to_string()));
        assert_eq!(back.string(&["CHN"]), Some("China".to_string()));
    }

    #[test]
    fn test_json_text_shape() {
        let model = HarxArray::from(&dense_two_by_two());
        let text = serde_json::to_string(&model).unwrap();
        assert!(text.contains("\"Header\":\"VAL1\""));
        assert!(text.contains("\"Type\":\"RE\""));
        assert!(text.contains("\"SerializedVectors\":1"));
        assert!(text.contains("\"[c1][r1]\":1.0"));
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let model = HarxArray::from(&dense_two_by_two());
        let keys: Vec<&String> = model.entries.keys().collect();
        assert_eq!(keys, ["[c1][r1]", "[c2][r1]", "[c1][r2]", "[c2][r2]"]);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut model = HarxArray::from(&dense_two_by_two());
        model.kind = "XX".to_string();
        assert!(HeaderArray::try_from(model).is_err());
    }

    #[test]
    fn test_entry_type_mismatch_rejected() {
        let mut model = HarxArray::from(&dense_two_by_two());
        model
            .entries
            .insert("[c1][r1]".to_string(), Value::String("oops".to_string()));
        assert!(HeaderArray::try_from(model).is_err());
    }
}
