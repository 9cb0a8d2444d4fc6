//! Criterion Tree Evaluation Engine
//!
//! This crate decides whether a clinical resource satisfies a criterion tree
//! and computes the composite match score used to rank cohort candidates:
//!
//! - **Value-Path Resolution**: symbolic location tags to dotted JSON paths
//! - **Value Predicates**: numeric, date and string/coded comparisons over
//!   every value found at a path
//! - **Entity Matching**: conjunction of predicates over one resource
//! - **Logical Combinators**: AND, NOT, MIN_OR(k), MAX_OR(k) with
//!   short-circuit matching
//! - **Score Aggregation**: per-operator scoring algebra over a precomputed
//!   per-leaf score table
//! - **Ranking**: ordering many patients' score tables by root score
//!
//! # Example
//!
//! ```ignore
//! use cohort_eval::CriterionEvaluator;
//!
//! let evaluator = CriterionEvaluator::new();
//! let matched = evaluator.matches(&tree, &resource)?;
//! let score = evaluator.score(&tree, &table)?;
//! ```
//!
//! # Purity
//!
//! Evaluation never performs I/O and never mutates its inputs. All scratch
//! state (the resource JSON tree, collected values, score diagnostics) lives
//! in per-call contexts, so one evaluator and one tree can be shared across
//! threads without synchronisation.

pub mod context;
pub mod engine;
pub mod entity;
pub mod error;
pub mod logical;
pub mod options;
pub mod path;
pub mod predicate;
pub mod ranking;
pub mod resource;
pub mod validate;

// Re-export main types
pub use context::{MatchContext, ScoreContext, ScoreDiagnostics};
pub use engine::CriterionEvaluator;
pub use error::{EvalError, EvalResult};
pub use options::EvaluationOptions;
pub use path::{PathResolver, ResolvedPath};
pub use ranking::RankedCandidate;
pub use predicate::{match_code, match_value, parse_date, parse_number};
pub use resource::{ProjectionError, RawResource, ResourceProjection};

// Re-export the scoring algebra
pub use logical::{mean, penalised_max, top_k_mean};
