//! Evaluation errors for the criterion engine

use cohort_criteria::{
    ClinicalEntityType, CriteriaError, LogicalOperator, OperandArity, ValueLocationPath,
    ValueRelation,
};
use thiserror::Error;
use uuid::Uuid;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while validating or evaluating a criterion tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Logical node without children
    #[error("Logical node {node_uid} has no children")]
    EmptyLogicalNode { node_uid: Uuid },

    /// MIN_OR / MAX_OR modifier out of range
    #[error("Numeric modifier {k} of {operator} node {node_uid} is out of range for {children} children")]
    ModifierOutOfRange {
        node_uid: Uuid,
        operator: LogicalOperator,
        k: i32,
        children: usize,
    },

    /// Wrong number of operands for the relation
    #[error("{relation} in node {node_uid} requires {expected} operands, found {found}")]
    OperandCount {
        node_uid: Uuid,
        relation: ValueRelation,
        expected: OperandArity,
        found: usize,
    },

    /// BETWEEN bounds not strictly increasing
    #[error("BETWEEN bounds in node {node_uid} must satisfy lower < upper, got [{lower}, {upper})")]
    InvalidBetweenBounds {
        node_uid: Uuid,
        lower: String,
        upper: String,
    },

    /// Coded path without terminology expansion
    #[error("Coded path {path} in node {node_uid} has no expanded codes")]
    MissingExpandedCodes {
        node_uid: Uuid,
        path: ValueLocationPath,
    },

    /// Expansion rows do not line up with operands
    #[error("Expanded codes of {path} in node {node_uid} have {rows} rows for {operands} operands")]
    ExpandedCodesShape {
        node_uid: Uuid,
        path: ValueLocationPath,
        rows: usize,
        operands: usize,
    },

    /// Relation applied to a domain it does not bind over
    #[error("Cannot execute {relation} on {domain} value '{value}'")]
    UnsupportedRelationForDomain {
        relation: ValueRelation,
        domain: String,
        value: String,
    },

    /// Predicate path belongs to another entity type
    #[error("Path {path} does not apply to {entity_type} entity {node_uid}")]
    PathNotApplicable {
        node_uid: Uuid,
        entity_type: ClinicalEntityType,
        path: ValueLocationPath,
    },

    /// Closed vocabulary widened without update
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}

impl EvalError {
    /// Create an unsupported relation error
    pub fn unsupported_relation(
        relation: ValueRelation,
        domain: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::UnsupportedRelationForDomain {
            relation,
            domain: domain.into(),
            value: value.into(),
        }
    }

    /// Create a BETWEEN bounds error
    pub fn invalid_between(node_uid: Uuid, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self::InvalidBetweenBounds {
            node_uid,
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Errors describing a malformed tree shape
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::EmptyLogicalNode { .. }
                | Self::ModifierOutOfRange { .. }
                | Self::OperandCount { .. }
                | Self::InvalidBetweenBounds { .. }
                | Self::MissingExpandedCodes { .. }
                | Self::ExpandedCodesShape { .. }
                | Self::PathNotApplicable { .. }
        )
    }
}
