//! Evidence references
//!
//! Resources produced by a data source carry ids of the form
//! `(nlp:)?<clinical_entity_type>:<evidence_uid>`; the `nlp:` prefix marks
//! facts extracted from clinical text rather than structured data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CriteriaError;
use crate::model::ClinicalEntityType;

const NLP_PREFIX: &str = "nlp:";

/// A scored reference to one source record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "evidenceUID")]
    pub evidence_uid: String,
    pub score: f64,
}

/// Parsed evidence identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvidenceId {
    /// Extracted by natural language processing
    pub nlp: bool,
    pub entity_type: ClinicalEntityType,
    /// Source-specific record id; may itself contain `:`
    pub uid: String,
}

impl EvidenceId {
    pub fn new(entity_type: ClinicalEntityType, uid: impl Into<String>) -> Self {
        Self {
            nlp: false,
            entity_type,
            uid: uid.into(),
        }
    }

    pub fn nlp(entity_type: ClinicalEntityType, uid: impl Into<String>) -> Self {
        Self {
            nlp: true,
            ..Self::new(entity_type, uid)
        }
    }

    pub fn parse(id: &str) -> Result<Self, CriteriaError> {
        let (nlp, rest) = match id.strip_prefix(NLP_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, id),
        };
        let (type_tag, uid) = rest
            .split_once(':')
            .ok_or_else(|| CriteriaError::invalid_evidence_id(id, "missing entity type separator"))?;
        if uid.is_empty() {
            return Err(CriteriaError::invalid_evidence_id(id, "empty evidence uid"));
        }
        let entity_type = type_tag
            .parse()
            .map_err(|_| CriteriaError::invalid_evidence_id(id, format!("unknown entity type '{}'", type_tag)))?;
        Ok(Self {
            nlp,
            entity_type,
            uid: uid.to_string(),
        })
    }
}

impl FromStr for EvidenceId {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nlp {
            f.write_str(NLP_PREFIX)?;
        }
        write!(f, "{}:{}", self.entity_type, self.uid)
    }
}
