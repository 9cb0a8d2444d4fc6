//! Reviewer adjudication status
//!
//! Machine-proposed matches are reviewed by one or more adjudicators. The
//! evaluator does not produce these records; they are consumed to decide a
//! final outcome per criterion and per cohort candidate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reviewer judgement of one criterion for one patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionJudgement {
    JudgedMatch,
    JudgedMismatch,
    EvidenceFound,
    EvidenceFoundNlp,
    NoEvidenceFound,
    Unjudged,
}

/// Reviewer decision on whether a candidate belongs in the cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateInclusion {
    Include,
    Exclude,
    Unreviewed,
}

/// Outcome category of an adjudication histogram
pub trait Verdict: Copy + Ord {
    /// The category of reviewers who have not decided yet
    fn is_pending(&self) -> bool;
}

impl Verdict for CriterionJudgement {
    fn is_pending(&self) -> bool {
        matches!(self, Self::Unjudged)
    }
}

impl Verdict for CandidateInclusion {
    fn is_pending(&self) -> bool {
        matches!(self, Self::Unreviewed)
    }
}

/// Reviewer-count histogram with an optional tiebreaker override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct AdjudicationStatus<T> {
    pub num_adjudicators: u32,
    #[serde(default = "BTreeMap::new")]
    pub status: BTreeMap<T, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiebreaker_override: Option<T>,
}

/// Per-criterion adjudication of one patient
pub type PatientAdjudicationStatus = AdjudicationStatus<CriterionJudgement>;

/// Per-cohort adjudication of one candidate
pub type CohortAdjudicationStatus = AdjudicationStatus<CandidateInclusion>;

impl<T: Verdict> AdjudicationStatus<T> {
    pub fn new(num_adjudicators: u32) -> Self {
        Self {
            num_adjudicators,
            status: BTreeMap::new(),
            tiebreaker_override: None,
        }
    }

    /// Record one reviewer's verdict
    pub fn record(&mut self, verdict: T) {
        *self.status.entry(verdict).or_insert(0) += 1;
    }

    pub fn count(&self, verdict: T) -> u32 {
        self.status.get(&verdict).copied().unwrap_or(0)
    }

    /// Number of reviewers who reached a decision
    pub fn reviewed(&self) -> u32 {
        self.status
            .iter()
            .filter(|(verdict, _)| !verdict.is_pending())
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.num_adjudicators > 0 && self.reviewed() >= self.num_adjudicators
    }

    /// Final outcome: the tiebreaker when set, otherwise the unique most-voted decision
    pub fn consensus(&self) -> Option<T> {
        if let Some(verdict) = self.tiebreaker_override {
            return Some(verdict);
        }

        let mut best: Option<(T, u32)> = None;
        let mut tied = false;
        for (verdict, count) in self.status.iter().filter(|(v, c)| !v.is_pending() && **c > 0) {
            match best {
                Some((_, top)) if *count == top => tied = true,
                Some((_, top)) if *count < top => {}
                _ => {
                    best = Some((*verdict, *count));
                    tied = false;
                }
            }
        }

        if tied { None } else { best.map(|(verdict, _)| verdict) }
    }
}

/// A patient proposed for a cohort and the decision on their inclusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCandidate {
    #[serde(rename = "patUID")]
    pub patient_uid: String,
    pub inclusion: CandidateInclusion,
}
