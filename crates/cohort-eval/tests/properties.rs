//! Evaluation properties over generated trees
//!
//! Leaf scores are drawn nonnegative: the MIN_OR monotonicity and MAX_OR
//! bound properties do not hold for negative child scores.

mod common;

use cohort_criteria::{Criterion, LogicalOperator, ScoreTable, ValueLocationPath, ValueRelation};
use cohort_eval::{CriterionEvaluator, EvaluationOptions};
use common::{evaluator, leaves, person_with, table_for};
use proptest::prelude::*;
use proptest::sample::select;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
enum Shape {
    Leaf { matches: bool, value: f64, sources: u32 },
    Node { operator: LogicalOperator, k_seed: usize, children: Vec<Shape> },
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = (any::<bool>(), 0.0..1.0f64, 1u32..5)
        .prop_map(|(matches, value, sources)| Shape::Leaf { matches, value, sources });
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            select(LogicalOperator::ALL.to_vec()),
            any::<usize>(),
            proptest::collection::vec(inner, 1..5),
        )
            .prop_map(|(operator, k_seed, children)| Shape::Node { operator, k_seed, children })
    })
}

fn build(shape: &Shape, table: &mut ScoreTable) -> Criterion {
    match shape {
        Shape::Leaf { matches, value, sources } => {
            let gender = if *matches { "a" } else { "b" };
            let leaf = person_with(ValueLocationPath::PersonGender, ValueRelation::Eq, &[gender]);
            table.insert(leaf.node_uid(), common::score(*value).with_data_source_count(common::sources(*sources)));
            leaf
        }
        Shape::Node { operator, k_seed, children } => {
            let k = 1 + k_seed % children.len();
            let built = children.iter().map(|c| build(c, table)).collect();
            Criterion::logical(*operator, k as i32, built)
        }
    }
}

/// Matching that always visits every child
fn exhaustive_matches(shape: &Shape) -> bool {
    match shape {
        Shape::Leaf { matches, .. } => *matches,
        Shape::Node { operator, k_seed, children } => {
            let k = 1 + k_seed % children.len();
            let matched = children.iter().filter(|c| exhaustive_matches(c)).count();
            match operator {
                LogicalOperator::And => matched == children.len(),
                LogicalOperator::Not => matched == 0,
                LogicalOperator::MinOr => matched >= k,
                LogicalOperator::MaxOr => matched <= k,
            }
        }
    }
}

fn resource() -> Value {
    json!({"resourceType": "Person", "gender": "a"})
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_evaluation_is_deterministic(shape in arb_shape()) {
        let mut table = ScoreTable::new();
        let tree = build(&shape, &mut table);
        let ev = evaluator();
        let resource = resource();

        prop_assert_eq!(ev.matches(&tree, &resource).unwrap(), ev.matches(&tree, &resource).unwrap());
        let first = ev.score(&tree, &table).unwrap();
        let second = ev.score(&tree, &table).unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn prop_short_circuit_matches_exhaustive(shape in arb_shape()) {
        let mut table = ScoreTable::new();
        let tree = build(&shape, &mut table);
        prop_assert_eq!(evaluator().matches(&tree, &resource()).unwrap(), exhaustive_matches(&shape));
    }

    #[test]
    fn prop_scores_are_finite(scores in proptest::collection::vec(any::<f64>(), 1..8), k in 1usize..8) {
        let children = leaves(scores.len());
        let table = table_for(&children, &scores);
        let ev = CriterionEvaluator::with_options(EvaluationOptions::default().lenient_modifiers());
        for operator in LogicalOperator::ALL {
            let tree = Criterion::logical(operator, k as i32, children.clone());
            prop_assert!(ev.score(&tree, &table).unwrap().is_finite());
        }
    }

    #[test]
    fn prop_min_or_non_increasing_in_k(scores in proptest::collection::vec(0.0..1.0f64, 1..8)) {
        let children = leaves(scores.len());
        let table = table_for(&children, &scores);
        let ev = CriterionEvaluator::with_options(EvaluationOptions::default().lenient_modifiers());

        let by_k: Vec<f64> = (1..=scores.len() + 2)
            .map(|k| ev.score(&Criterion::min_or(k as i32, children.clone()), &table).unwrap())
            .collect();
        for pair in by_k.windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1e-12, "{:?}", by_k);
        }
    }

    #[test]
    fn prop_max_or_bounded_by_peak(scores in proptest::collection::vec(0.0..1.0f64, 1..8), k_seed in any::<usize>()) {
        let children = leaves(scores.len());
        let table = table_for(&children, &scores);
        let k = 1 + k_seed % scores.len();
        let peak = scores.iter().copied().fold(0.0, f64::max);

        let score = evaluator().score(&Criterion::max_or(k as i32, children), &table).unwrap();
        prop_assert!(score <= peak + 1e-12);
    }

    #[test]
    fn prop_doubling_sources_halves_leaf(value in 0.0..100.0f64, sources in 1u32..1000) {
        let children = leaves(1);
        let uid = children[0].node_uid();
        let tree = Criterion::and(children);

        let mut single = ScoreTable::new();
        single.insert(uid, common::score(value).with_data_source_count(common::sources(sources)));
        let mut doubled = ScoreTable::new();
        doubled.insert(uid, common::score(value).with_data_source_count(common::sources(sources * 2)));

        let base = evaluator().score(&tree, &single).unwrap();
        let halved = evaluator().score(&tree, &doubled).unwrap();
        prop_assert!((halved * 2.0 - base).abs() <= 1e-9 * base.max(1.0));
    }
}
