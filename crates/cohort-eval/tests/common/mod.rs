//! Shared builders for evaluator integration tests

#![allow(dead_code)]

use std::num::NonZeroU32;

use cohort_criteria::{
    CandidateScore, ClinicalEntityType, Criterion, ScoreTable, ValueLocationPath, ValuePredicate,
    ValueRelation, build_resource,
};
use cohort_eval::CriterionEvaluator;
use serde_json::Value;
use uuid::Uuid;

pub const PATIENT: &str = "patient-1";

pub fn evaluator() -> CriterionEvaluator {
    CriterionEvaluator::new()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Resources
// ============================================================================

pub fn condition(codes: &[&str]) -> Value {
    build_resource(ClinicalEntityType::Condition, "cond-1", [("code.coding.code", strings(codes))])
}

pub fn person(gender: &str, birth_date: &str) -> Value {
    build_resource(
        ClinicalEntityType::Person,
        "person-1",
        [("gender", strings(&[gender])), ("birthDate", strings(&[birth_date]))],
    )
}

pub fn observation(code: &str, value: &str) -> Value {
    build_resource(
        ClinicalEntityType::Observation,
        "obs-1",
        [("code.coding.code", strings(&[code])), ("valueString", strings(&[value]))],
    )
}

// ============================================================================
// Criteria
// ============================================================================

/// Condition leaf matching any of `codes`, expanded from a single operand
pub fn condition_in(codes: &[&str]) -> Criterion {
    Criterion::entity(
        ClinicalEntityType::Condition,
        vec![ValuePredicate::coded(
            ValueLocationPath::ConditionCode,
            ValueRelation::In,
            ["concept"],
            vec![strings(codes)],
        )],
    )
}

pub fn person_with(path: ValueLocationPath, relation: ValueRelation, values: &[&str]) -> Criterion {
    Criterion::entity(
        ClinicalEntityType::Person,
        vec![ValuePredicate::new(path, relation, values.iter().copied())],
    )
}

pub fn observation_value(relation: ValueRelation, values: &[&str]) -> Criterion {
    Criterion::entity(
        ClinicalEntityType::Observation,
        vec![ValuePredicate::new(
            ValueLocationPath::ObservationValue,
            relation,
            values.iter().copied(),
        )],
    )
}

/// `n` distinct gender leaves; only used for scoring
pub fn leaves(n: usize) -> Vec<Criterion> {
    (0..n)
        .map(|i| {
            person_with(ValueLocationPath::PersonGender, ValueRelation::Eq, &["female"])
                .with_title(format!("leaf {}", i))
        })
        .collect()
}

// ============================================================================
// Score tables
// ============================================================================

pub fn sources(count: u32) -> NonZeroU32 {
    NonZeroU32::new(count).expect("at least one data source")
}

pub fn score(value: f64) -> CandidateScore {
    CandidateScore::new(PATIENT, value, [format!("CONDITION:{}", Uuid::new_v4())])
}

/// Table giving each leaf of `children` the matching score
pub fn table_for(children: &[Criterion], scores: &[f64]) -> ScoreTable {
    children
        .iter()
        .zip(scores)
        .map(|(child, s)| (child.node_uid(), score(*s)))
        .collect()
}

pub fn assert_close(left: f64, right: f64) {
    assert!((left - right).abs() < 1e-9, "{} != {}", left, right);
}
