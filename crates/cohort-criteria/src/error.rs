//! Errors raised while decoding or manipulating criteria

use thiserror::Error;

/// Result type for criteria operations
pub type CriteriaResult<T> = Result<T, CriteriaError>;

/// Errors produced by the criteria model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// A value location tag with no mapping
    #[error("Unknown value location path: {tag}")]
    UnknownPath { tag: String },

    /// A logical operator outside AND / NOT / MIN_OR / MAX_OR
    #[error("Unsupported logical operator: {op}")]
    UnsupportedLogicalOp { op: String },

    /// A value relation outside the closed relation set
    #[error("Unknown value relation: {reln}")]
    UnknownRelation { reln: String },

    /// A clinical entity type outside the closed entity set
    #[error("Unknown clinical entity type: {name}")]
    UnknownEntityType { name: String },

    /// Malformed evidence identifier
    #[error("Invalid evidence id '{id}': {message}")]
    InvalidEvidenceId { id: String, message: String },

    /// Attempt to merge scores that belong to different patients
    #[error("Cannot merge score of patient {right} into score of patient {left}")]
    PatientMismatch { left: String, right: String },
}

impl CriteriaError {
    /// Create an unknown path error
    pub fn unknown_path(tag: impl Into<String>) -> Self {
        Self::UnknownPath { tag: tag.into() }
    }

    /// Create an unsupported logical operator error
    pub fn unsupported_logical_op(op: impl Into<String>) -> Self {
        Self::UnsupportedLogicalOp { op: op.into() }
    }

    /// Create an unknown relation error
    pub fn unknown_relation(reln: impl Into<String>) -> Self {
        Self::UnknownRelation { reln: reln.into() }
    }

    /// Create an unknown entity type error
    pub fn unknown_entity_type(name: impl Into<String>) -> Self {
        Self::UnknownEntityType { name: name.into() }
    }

    /// Create an invalid evidence id error
    pub fn invalid_evidence_id(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEvidenceId {
            id: id.into(),
            message: message.into(),
        }
    }
}
