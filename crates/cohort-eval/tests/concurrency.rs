//! Shared evaluation across threads

mod common;

use std::thread;

use cohort_criteria::Criterion;
use common::{assert_close, condition, condition_in, evaluator, leaves, table_for};

#[test]
fn test_shared_tree_and_evaluator() {
    let children = leaves(4);
    let table = table_for(&children, &[0.2, 0.8, 0.9, 0.1]);
    let scored = Criterion::min_or(2, children);
    let matched = Criterion::min_or(1, vec![condition_in(&["44054006"]), condition_in(&["38341003"])]);
    let resource = condition(&["38341003"]);
    let ev = evaluator();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..50)
                        .map(|_| {
                            let score = ev.score(&scored, &table).unwrap();
                            let hit = ev.matches(&matched, &resource).unwrap();
                            (score, hit)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for (score, hit) in handle.join().unwrap() {
                assert_close(score, 0.85);
                assert!(hit);
            }
        }
    });
}
