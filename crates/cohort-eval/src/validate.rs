//! Structural validation of criterion trees
//!
//! Validation runs once at evaluator entry, before any resource or score is
//! inspected, so a malformed tree fails the same way no matter what it is
//! evaluated against.

use cohort_criteria::{Criterion, EntityCriterion, LogicalCriterion, ValuePredicate, ValueRelation};
use log::debug;
use uuid::Uuid;

use crate::engine::CriterionEvaluator;
use crate::error::{EvalError, EvalResult};
use crate::predicate::{parse_epoch_millis, parse_number};

impl CriterionEvaluator {
    /// Check the whole tree rooted at `root`
    pub fn validate(&self, root: &Criterion) -> EvalResult<()> {
        let mut logical = 0usize;
        let mut entities = 0usize;
        for node in root.iter() {
            match node {
                Criterion::Logical(l) => {
                    logical += 1;
                    self.validate_logical(l)?;
                }
                Criterion::Entity(e) => {
                    entities += 1;
                    self.validate_entity(e)?;
                }
            }
        }
        debug!(
            "Validated criterion {}: {} logical nodes, {} entities",
            root.node_uid(),
            logical,
            entities
        );
        Ok(())
    }

    fn validate_logical(&self, logical: &LogicalCriterion) -> EvalResult<()> {
        let node_uid = logical.node.node_uid;
        let children = logical.children.len();
        if children == 0 {
            return Err(EvalError::EmptyLogicalNode { node_uid });
        }

        if logical.operator.uses_modifier() {
            let k = logical.numeric_modifier;
            let too_large = usize::try_from(k).is_ok_and(|k| k > children);
            if k < 1 || (self.options().strict_modifier_bounds && too_large) {
                return Err(EvalError::ModifierOutOfRange {
                    node_uid,
                    operator: logical.operator,
                    k,
                    children,
                });
            }
        }
        Ok(())
    }

    fn validate_entity(&self, entity: &EntityCriterion) -> EvalResult<()> {
        let node_uid = entity.node.node_uid;
        for predicate in &entity.components {
            if self.options().check_entity_paths && predicate.value_path.entity_type() != entity.entity_type {
                return Err(EvalError::PathNotApplicable {
                    node_uid,
                    entity_type: entity.entity_type,
                    path: predicate.value_path,
                });
            }
            validate_predicate(node_uid, predicate)?;
        }
        Ok(())
    }
}

fn validate_predicate(node_uid: Uuid, predicate: &ValuePredicate) -> EvalResult<()> {
    let relation = predicate.relation;
    let operands = predicate.values.len();

    let expected = relation.arity();
    if !expected.accepts(operands) {
        return Err(EvalError::OperandCount {
            node_uid,
            relation,
            expected,
            found: operands,
        });
    }

    if predicate.value_path.is_coded() {
        let expanded = predicate
            .expanded_codes
            .as_ref()
            .ok_or(EvalError::MissingExpandedCodes {
                node_uid,
                path: predicate.value_path,
            })?;
        if expanded.len() != operands {
            return Err(EvalError::ExpandedCodesShape {
                node_uid,
                path: predicate.value_path,
                rows: expanded.len(),
                operands,
            });
        }
    }

    if relation.is_ordering() {
        if let Some(operand) = predicate
            .values
            .iter()
            .find(|v| parse_number(v).is_none() && parse_epoch_millis(v).is_none())
        {
            return Err(EvalError::unsupported_relation(relation, "string", operand.as_str()));
        }
    }

    if relation == ValueRelation::Between {
        if let [lower, upper] = predicate.values.as_slice() {
            if !bounds_increasing(lower, upper) {
                return Err(EvalError::invalid_between(node_uid, lower.as_str(), upper.as_str()));
            }
        }
    }
    Ok(())
}

fn bounds_increasing(lower: &str, upper: &str) -> bool {
    if let (Some(lo), Some(hi)) = (parse_number(lower), parse_number(upper)) {
        return lo < hi;
    }
    match (parse_epoch_millis(lower), parse_epoch_millis(upper)) {
        (Some(lo), Some(hi)) => lo < hi,
        _ => false,
    }
}
