//! Criterion Evaluation Engine
//!
//! This module provides [`CriterionEvaluator`], which validates criterion
//! trees, matches them against resources and scores them against
//! precomputed per-leaf score tables.

use cohort_criteria::{Criterion, ScoreTable};
use log::debug;

use crate::context::{MatchContext, ScoreContext};
use crate::error::EvalResult;
use crate::options::EvaluationOptions;
use crate::path::PathResolver;
use crate::resource::ResourceProjection;

/// The criterion evaluator
///
/// The evaluator holds only configuration. It is cheap to clone and safe to
/// share across threads; every call gets its own context.
#[derive(Debug, Clone)]
pub struct CriterionEvaluator {
    options: EvaluationOptions,
    resolver: PathResolver,
}

impl Default for CriterionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl CriterionEvaluator {
    /// Create an evaluator with default options
    pub fn new() -> Self {
        Self::with_options(EvaluationOptions::default())
    }

    /// Create an evaluator with custom options
    pub fn with_options(options: EvaluationOptions) -> Self {
        let resolver = match &options.path_prefix {
            Some(prefix) => PathResolver::with_prefix(prefix.clone()),
            None => PathResolver::new(),
        };
        Self { options, resolver }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Decide whether `resource` satisfies the tree rooted at `root`
    ///
    /// The tree is validated first; a malformed tree is an error, while a
    /// resource that lacks the inspected attributes simply does not match.
    pub fn matches<R: ResourceProjection + ?Sized>(&self, root: &Criterion, resource: &R) -> EvalResult<bool> {
        let mut ctx = MatchContext::new(resource);
        self.matches_with_context(root, &mut ctx)
    }

    /// Match using a caller-owned context
    pub fn matches_with_context(&self, root: &Criterion, ctx: &mut MatchContext<'_>) -> EvalResult<bool> {
        self.validate(root)?;
        let matched = self.match_criterion(root, ctx)?;
        debug!(
            "Criterion {} matched={} after {} predicates",
            root.node_uid(),
            matched,
            ctx.predicates_evaluated()
        );
        Ok(matched)
    }

    /// Composite score of the tree rooted at `root` for one patient's table
    pub fn score(&self, root: &Criterion, table: &ScoreTable) -> EvalResult<f64> {
        let mut ctx = ScoreContext::new(table);
        self.score_with_context(root, &mut ctx)
    }

    /// Score using a caller-owned context, keeping its diagnostics
    pub fn score_with_context(&self, root: &Criterion, ctx: &mut ScoreContext<'_>) -> EvalResult<f64> {
        self.validate(root)?;
        let score = self.score_criterion(root, ctx);
        let score = ctx.finite(root.node_uid(), score);
        debug!(
            "Criterion {} scored {} ({:?})",
            root.node_uid(),
            score,
            ctx.diagnostics()
        );
        Ok(score)
    }

    /// Match a node without re-validating
    ///
    /// Predicate evaluation can still fail for relations that do not bind
    /// over the resource's value domain.
    pub(crate) fn match_criterion(&self, node: &Criterion, ctx: &mut MatchContext<'_>) -> EvalResult<bool> {
        match node {
            Criterion::Entity(entity) => self.match_entity(entity, ctx),
            Criterion::Logical(logical) => self.match_logical(logical, ctx),
        }
    }

    pub(crate) fn score_criterion(&self, node: &Criterion, ctx: &mut ScoreContext<'_>) -> f64 {
        match node {
            Criterion::Entity(entity) => self.score_entity(entity, ctx),
            Criterion::Logical(logical) => self.score_logical(logical, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_criteria::{CandidateScore, ClinicalEntityType, ValueLocationPath, ValuePredicate, ValueRelation};
    use serde_json::json;

    fn gender_leaf(gender: &str) -> Criterion {
        Criterion::entity(
            ClinicalEntityType::Person,
            vec![ValuePredicate::new(
                ValueLocationPath::PersonGender,
                ValueRelation::Eq,
                [gender],
            )],
        )
    }

    #[test]
    fn test_prefix_option_configures_resolver() {
        let evaluator = CriterionEvaluator::with_options(EvaluationOptions::default().with_path_prefix("contained"));
        assert_eq!(evaluator.resolver().prefix(), Some("contained"));

        let resource = json!({"contained": [{"gender": "male"}, {"gender": "female"}]});
        assert!(evaluator.matches(&gender_leaf("female"), &resource).unwrap());
        assert!(!CriterionEvaluator::new().matches(&gender_leaf("female"), &resource).unwrap());
    }

    #[test]
    fn test_matches_raw_json_text() {
        let evaluator = CriterionEvaluator::new();
        let text = r#"{"resourceType": "Person", "gender": "Female"}"#;
        assert!(evaluator.matches(&gender_leaf("female"), text).unwrap());
        assert!(!evaluator.matches(&gender_leaf("female"), "{broken").unwrap());
    }

    #[test]
    fn test_score_with_context_exposes_diagnostics() {
        let leaf = gender_leaf("female");
        let mut table = ScoreTable::new();
        table.insert(leaf.node_uid(), CandidateScore::new("p1", 0.5, ["PERSON:p1"]));
        let root = Criterion::and(vec![leaf, gender_leaf("male")]);

        let mut ctx = ScoreContext::new(&table);
        let score = CriterionEvaluator::new().score_with_context(&root, &mut ctx).unwrap();
        assert_eq!(score, 0.25);
        assert_eq!(ctx.diagnostics().leaves_visited, 2);
        assert_eq!(ctx.diagnostics().missing_leaves, 1);
    }
}
