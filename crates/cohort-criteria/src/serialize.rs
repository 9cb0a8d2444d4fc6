//! Wire format codec
//!
//! Criterion trees and score tables cross pipeline boundaries as JSON: trees
//! as a `nodeType` tagged union with RFC-4122 `nodeUID` strings, score
//! tables as objects keyed by leaf `nodeUID`.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::Criterion;
use crate::score::ScoreTable;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document exchanged in the wire format
pub trait WireDocument: Serialize + DeserializeOwned {}

impl WireDocument for Criterion {}
impl WireDocument for ScoreTable {}

/// JSON codec for wire documents
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn encode<D: WireDocument>(&self, document: &D) -> Result<String, SerializeError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }

    pub fn write<D: WireDocument, W: Write>(&self, document: &D, writer: W) -> Result<(), SerializeError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, document)?;
        } else {
            serde_json::to_writer(writer, document)?;
        }
        Ok(())
    }

    pub fn decode<D: WireDocument>(&self, input: &str) -> Result<D, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn read<D: WireDocument, R: Read>(&self, reader: R) -> Result<D, SerializeError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Criterion {
    pub fn to_json(&self) -> Result<String, SerializeError> {
        JsonCodec::new().encode(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, SerializeError> {
        JsonCodec::pretty().encode(self)
    }

    pub fn from_json(json: &str) -> Result<Self, SerializeError> {
        JsonCodec::new().decode(json)
    }
}

/// Decode a score table keyed by leaf `nodeUID`
pub fn score_table_from_json(json: &str) -> Result<ScoreTable, SerializeError> {
    JsonCodec::new().decode(json)
}

pub fn score_table_to_json(table: &ScoreTable) -> Result<String, SerializeError> {
    JsonCodec::new().encode(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    use crate::model::{ClinicalEntityType, LogicalOperator, ValueLocationPath, ValuePredicate, ValueRelation};
    use crate::score::CandidateScore;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn sample_tree() -> Criterion {
        Criterion::min_or(
            1,
            vec![
                Criterion::entity(
                    ClinicalEntityType::Condition,
                    vec![ValuePredicate::coded(
                        ValueLocationPath::ConditionCode,
                        ValueRelation::In,
                        ["C1"],
                        vec![vec!["44054006".to_string(), "73211009".to_string()]],
                    )],
                )
                .with_title("Diabetes"),
                Criterion::entity(
                    ClinicalEntityType::Person,
                    vec![ValuePredicate::new(
                        ValueLocationPath::PersonDob,
                        ValueRelation::Between,
                        ["1950-01-01", "1960-01-01"],
                    )],
                ),
            ],
        )
    }

    #[test]
    fn test_wire_field_names() {
        let tree = sample_tree();
        let value: Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();

        assert_eq!(value["nodeType"], "LOGICAL");
        assert_eq!(value["type"], "MIN_OR");
        assert_eq!(value["numericModifier"], 1);
        assert_eq!(value["nodeUID"], tree.node_uid().to_string());

        let leaf = &value["children"][0];
        assert_eq!(leaf["nodeType"], "ENTITY");
        assert_eq!(leaf["type"], "CONDITION");
        assert_eq!(leaf["title"], "Diabetes");
        assert_eq!(leaf["components"][0]["valuePath"], "CONDITION_CODE");
        assert_eq!(leaf["components"][0]["reln"], "IN");
        assert_eq!(leaf["components"][0]["values"], json!(["C1"]));
        assert_eq!(
            leaf["components"][0]["expandedCodes"],
            json!([["44054006", "73211009"]])
        );
        assert!(value["children"][1]["components"][0].get("expandedCodes").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let tree = sample_tree();
        let parsed = Criterion::from_json(&tree.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn test_decode_external_document() {
        let json = r#"{
            "nodeUID": "6f1c2a1e-8f0b-4c55-9a43-2b7d7f1f0b11",
            "title": "Inclusion",
            "nodeType": "LOGICAL",
            "type": "AND",
            "children": [{
                "nodeUID": "0b6a8f7e-2d0e-4c3c-8c9c-5c1b6db7a2f4",
                "nodeType": "ENTITY",
                "type": "OBSERVATION",
                "components": [{"valuePath": "OBSERVATION_VALUE", "reln": "GTE", "values": ["7.5"]}]
            }]
        }"#;
        let tree = Criterion::from_json(json).unwrap();
        match &tree {
            Criterion::Logical(l) => {
                assert_eq!(l.operator, LogicalOperator::And);
                assert_eq!(l.numeric_modifier, 0);
                assert_eq!(l.children.len(), 1);
            }
            Criterion::Entity(_) => panic!("Expected logical root"),
        }
        assert_eq!(tree.title(), Some("Inclusion"));
    }

    #[test]
    fn test_decode_rejects_unknown_tags() {
        let bad_path = r#"{"nodeUID": "0b6a8f7e-2d0e-4c3c-8c9c-5c1b6db7a2f4", "nodeType": "ENTITY",
            "type": "CONDITION", "components": [{"valuePath": "CONDITION_ONSET", "reln": "EQ", "values": ["x"]}]}"#;
        let err = Criterion::from_json(bad_path).unwrap_err();
        assert!(err.to_string().contains("Unknown value location path"));

        let bad_op = r#"{"nodeUID": "0b6a8f7e-2d0e-4c3c-8c9c-5c1b6db7a2f4", "nodeType": "LOGICAL",
            "type": "XOR", "children": []}"#;
        let err = Criterion::from_json(bad_op).unwrap_err();
        assert!(err.to_string().contains("Unsupported logical operator"));

        let bad_node = r#"{"nodeUID": "0b6a8f7e-2d0e-4c3c-8c9c-5c1b6db7a2f4", "nodeType": "GROUP"}"#;
        assert!(Criterion::from_json(bad_node).is_err());
    }

    #[test]
    fn test_writer_roundtrip() {
        let tree = sample_tree();
        let mut buffer = Vec::new();
        JsonCodec::pretty().write(&tree, &mut buffer).unwrap();
        let parsed: Criterion = JsonCodec::new().read(buffer.as_slice()).unwrap();
        assert_eq!(parsed.node_uid(), tree.node_uid());
    }

    #[test]
    fn test_score_table_codec() {
        let leaf = Uuid::new_v4();
        let mut table = ScoreTable::new();
        table.insert(leaf, CandidateScore::new("p1", 2.0, ["CONDITION:1"]).with_data_source_count(NonZeroU32::new(4).unwrap()));

        let json = score_table_to_json(&table).unwrap();
        assert!(json.contains(&leaf.to_string()));
        let parsed = score_table_from_json(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
