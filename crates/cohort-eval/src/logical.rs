//! Logical combinators
//!
//! Implements matching and scoring for AND, NOT, MIN_OR(k) and MAX_OR(k).
//!
//! | Op        | matches                 | score                                   |
//! |-----------|-------------------------|-----------------------------------------|
//! | AND       | all children match      | `mean(S)`                               |
//! | NOT       | no child matches        | `-mean(S)`                              |
//! | MIN_OR(k) | at least `k` match      | mean of the top `k`, zero padded        |
//! | MAX_OR(k) | at most `k` match       | `max(S) - mean(bottom k, zero padded)`  |
//!
//! Matching short-circuits in child order. Scoring visits every child.

use cohort_criteria::{LogicalCriterion, LogicalOperator};
use log::trace;
use smallvec::SmallVec;

use crate::context::{MatchContext, ScoreContext};
use crate::engine::CriterionEvaluator;
use crate::error::EvalResult;

/// Arithmetic mean; zero for no scores
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

fn sorted_ascending(scores: &[f64]) -> SmallVec<[f64; 8]> {
    let mut sorted: SmallVec<[f64; 8]> = SmallVec::from_slice(scores);
    // Stable: ties keep child order
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Mean of the `k` largest scores, padding missing slots with zero
pub fn top_k_mean(scores: &[f64], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let sorted = sorted_ascending(scores);
    let take = k.min(sorted.len());
    let top: f64 = sorted[sorted.len() - take..].iter().sum();
    top / k as f64
}

/// Peak score less the mean of the `k` smallest scores, padding with zero
pub fn penalised_max(scores: &[f64], k: usize) -> f64 {
    let base = scores.iter().copied().reduce(f64::max).unwrap_or(0.0);
    if k == 0 {
        return base;
    }
    let sorted = sorted_ascending(scores);
    let take = k.min(sorted.len());
    let bottom: f64 = sorted[..take].iter().sum();
    base - bottom / k as f64
}

fn modifier(logical: &LogicalCriterion) -> usize {
    usize::try_from(logical.numeric_modifier).unwrap_or(0)
}

impl CriterionEvaluator {
    /// Match a logical node, stopping as soon as the outcome is decided
    pub fn match_logical(&self, logical: &LogicalCriterion, ctx: &mut MatchContext<'_>) -> EvalResult<bool> {
        let k = modifier(logical);
        let result = match logical.operator {
            LogicalOperator::And => {
                let mut all = true;
                for child in &logical.children {
                    if !self.match_criterion(child, ctx)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            LogicalOperator::Not => {
                let mut none = true;
                for child in &logical.children {
                    if self.match_criterion(child, ctx)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            LogicalOperator::MinOr => {
                let mut matched = 0;
                let mut reached = k == 0;
                for child in &logical.children {
                    if reached {
                        break;
                    }
                    if self.match_criterion(child, ctx)? {
                        matched += 1;
                        reached = matched >= k;
                    }
                }
                reached
            }
            LogicalOperator::MaxOr => {
                let mut matched = 0;
                let mut within = true;
                for child in &logical.children {
                    if self.match_criterion(child, ctx)? {
                        matched += 1;
                        if matched > k {
                            within = false;
                            break;
                        }
                    }
                }
                within
            }
        };

        trace!(
            "{} node {} (k={}) matched={}",
            logical.operator, logical.node.node_uid, logical.numeric_modifier, result
        );
        Ok(result)
    }

    /// Score a logical node from the scores of all its children
    pub fn score_logical(&self, logical: &LogicalCriterion, ctx: &mut ScoreContext<'_>) -> f64 {
        let scores: SmallVec<[f64; 8]> = logical
            .children
            .iter()
            .map(|child| self.score_criterion(child, ctx))
            .collect();

        let k = modifier(logical);
        let score = match logical.operator {
            LogicalOperator::And => mean(&scores),
            LogicalOperator::Not => -mean(&scores),
            LogicalOperator::MinOr => top_k_mean(&scores, k),
            LogicalOperator::MaxOr => penalised_max(&scores, k),
        };
        ctx.finite(logical.node.node_uid, score)
    }
}
