//! Cohort discovery criterion evaluation for Rust
//!
//! This crate bundles the cohort criterion stack:
//! - Criterion tree data model and JSON wire format
//! - Matching of FHIR-shaped resources against criterion trees
//! - Composite scoring over precomputed per-leaf score tables
//! - Candidate ranking
//!
//! # Example
//!
//! ```ignore
//! use cohort::{Criterion, CriterionEvaluator};
//!
//! let tree = Criterion::from_json(&std::fs::read_to_string("tree.json")?)?;
//! let evaluator = CriterionEvaluator::new();
//! let matched = evaluator.matches(&tree, &resource)?;
//! ```

// Re-export all public APIs from internal crates
pub use cohort_criteria as criteria;
pub use cohort_eval as eval;

// Convenience re-exports
pub use cohort_criteria::{CandidateScore, Criterion, ScoreTable};
pub use cohort_eval::{CriterionEvaluator, EvalError, EvalResult, EvaluationOptions};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
