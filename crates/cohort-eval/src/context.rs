//! Per-call evaluation state
//!
//! Evaluation never stores state on the evaluator or the tree. Matching
//! carries the projected resource in a [`MatchContext`]; scoring carries the
//! score table and its [`ScoreDiagnostics`] in a [`ScoreContext`].

use std::borrow::Cow;

use cohort_criteria::ScoreTable;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::resource::ResourceProjection;

/// State for matching one resource against one tree
#[derive(Debug)]
pub struct MatchContext<'r> {
    resource: Option<Cow<'r, Value>>,
    predicates_evaluated: usize,
}

impl<'r> MatchContext<'r> {
    /// Project `resource` into its JSON view
    ///
    /// A resource that cannot be projected is kept as absent: every
    /// predicate over it is a soft miss.
    pub fn new<R: ResourceProjection + ?Sized>(resource: &'r R) -> Self {
        let resource = match resource.project() {
            Ok(projected) => Some(projected),
            Err(e) => {
                warn!("Resource projection failed, treating as no match: {}", e);
                None
            }
        };
        Self {
            resource,
            predicates_evaluated: 0,
        }
    }

    pub fn resource(&self) -> Option<&Value> {
        self.resource.as_deref()
    }

    /// Number of predicates evaluated so far
    pub fn predicates_evaluated(&self) -> usize {
        self.predicates_evaluated
    }

    pub(crate) fn record_predicates(&mut self, count: usize) {
        self.predicates_evaluated += count;
    }
}

/// Counters collected while scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDiagnostics {
    /// NaN or infinite intermediates replaced by zero
    pub non_finite_clamped: usize,
    /// Entity leaves with no entry in the score table
    pub missing_leaves: usize,
    /// Entity leaves visited
    pub leaves_visited: usize,
}

/// State for scoring one patient's table against one tree
#[derive(Debug)]
pub struct ScoreContext<'a> {
    table: &'a ScoreTable,
    diagnostics: ScoreDiagnostics,
}

impl<'a> ScoreContext<'a> {
    pub fn new(table: &'a ScoreTable) -> Self {
        Self {
            table,
            diagnostics: ScoreDiagnostics::default(),
        }
    }

    pub fn table(&self) -> &ScoreTable {
        self.table
    }

    pub fn diagnostics(&self) -> ScoreDiagnostics {
        self.diagnostics
    }

    /// Normalised score of a leaf; zero when the table has no entry
    pub(crate) fn leaf_score(&mut self, node_uid: Uuid) -> f64 {
        self.diagnostics.leaves_visited += 1;
        match self.table.get(&node_uid) {
            Some(entry) => self.finite(node_uid, entry.leaf_score()),
            None => {
                self.diagnostics.missing_leaves += 1;
                0.0
            }
        }
    }

    /// Replace a non-finite score with zero
    pub(crate) fn finite(&mut self, node_uid: Uuid, score: f64) -> f64 {
        if score.is_finite() {
            score
        } else {
            self.diagnostics.non_finite_clamped += 1;
            warn!("Non-finite score {} at node {} clamped to 0", score, node_uid);
            0.0
        }
    }
}
