//! Clinical eligibility criteria model
//!
//! This crate provides:
//! - Criterion tree structures (entity matchers and logical combinators)
//! - The closed vocabularies the tree is built from (entity types, value
//!   location paths, value relations, logical operators)
//! - Precomputed candidate scores and evidence identifiers
//! - Reviewer adjudication status types
//! - JSON serialization compatible with the criterion wire format

pub mod adjudication;
pub mod error;
pub mod evidence;
pub mod model;
pub mod resource;
pub mod score;
pub mod serialize;

pub use adjudication::*;
pub use error::{CriteriaError, CriteriaResult};
pub use evidence::{Evidence, EvidenceId};
pub use model::*;
pub use resource::build_resource;
pub use score::{CandidateScore, ScoreTable};
pub use serialize::{
    JsonCodec, SerializeError, WireDocument, score_table_from_json, score_table_to_json,
};
