//! Precomputed per-leaf candidate scores
//!
//! Scores are produced outside the evaluator by the pipeline that ran leaf
//! predicates over actual records, and are consumed read-only when a tree is
//! scored.

use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CriteriaError, CriteriaResult};

/// Per-leaf score table for one patient, keyed by leaf `nodeUID`
pub type ScoreTable = HashMap<Uuid, CandidateScore>;

fn default_data_source_count() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// Aggregated evidence for one leaf criterion and one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    #[serde(rename = "patientUID")]
    pub patient_uid: String,
    /// Raw score summed over all contributing data sources
    pub score: f64,
    /// Number of data sources that contributed to `score`; never zero
    #[serde(rename = "dataSourceCount", default = "default_data_source_count")]
    pub data_source_count: NonZeroU32,
    /// Ids of the source records that satisfied the leaf
    #[serde(rename = "evidenceIDs", default)]
    pub evidence_ids: BTreeSet<String>,
}

impl CandidateScore {
    /// Score backed by a single data source
    pub fn new<I, S>(patient_uid: impl Into<String>, score: f64, evidence_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patient_uid: patient_uid.into(),
            score,
            data_source_count: NonZeroU32::MIN,
            evidence_ids: evidence_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_data_source_count(mut self, data_source_count: NonZeroU32) -> Self {
        self.data_source_count = data_source_count;
        self
    }

    /// Score normalised across data sources
    pub fn leaf_score(&self) -> f64 {
        self.score / f64::from(self.data_source_count.get())
    }

    /// Fold in the same leaf's result from another data source
    pub fn merge(&mut self, other: &CandidateScore) -> CriteriaResult<()> {
        if self.patient_uid != other.patient_uid {
            return Err(CriteriaError::PatientMismatch {
                left: self.patient_uid.clone(),
                right: other.patient_uid.clone(),
            });
        }
        self.score += other.score;
        self.data_source_count = self.data_source_count.saturating_add(other.data_source_count.get());
        self.evidence_ids.extend(other.evidence_ids.iter().cloned());
        Ok(())
    }
}
