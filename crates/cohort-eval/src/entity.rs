//! Entity leaf matching and scoring

use cohort_criteria::EntityCriterion;
use log::trace;

use crate::context::{MatchContext, ScoreContext};
use crate::engine::CriterionEvaluator;
use crate::error::EvalResult;

impl CriterionEvaluator {
    /// An entity matches iff every component predicate matches the resource
    ///
    /// An entity with no components matches any present resource.
    pub fn match_entity(&self, entity: &EntityCriterion, ctx: &mut MatchContext<'_>) -> EvalResult<bool> {
        let Some(resource) = ctx.resource() else {
            trace!("Entity {} has no resource to inspect", entity.node.node_uid);
            return Ok(false);
        };

        let mut evaluated = 0;
        let mut matched = true;
        for predicate in &entity.components {
            evaluated += 1;
            if !self.match_predicate(entity.node.node_uid, predicate, resource)? {
                matched = false;
                break;
            }
        }
        ctx.record_predicates(evaluated);

        trace!("Entity {} ({}) matched={}", entity.node.node_uid, entity.entity_type, matched);
        Ok(matched)
    }

    /// An entity leaf scores its normalised table entry, or zero when absent
    pub fn score_entity(&self, entity: &EntityCriterion, ctx: &mut ScoreContext<'_>) -> f64 {
        ctx.leaf_score(entity.node.node_uid)
    }
}
