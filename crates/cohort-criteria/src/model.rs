//! Criterion tree structures
//!
//! A criterion tree is a polymorphic expression whose leaves are
//! [`EntityCriterion`] matchers and whose inner nodes are
//! [`LogicalCriterion`] combinators. Every node carries a stable UUID that
//! keys precomputed per-leaf scores across pipeline boundaries.
//!
//! The serialized form is a tagged union discriminated by `nodeType`
//! (`LOGICAL` / `ENTITY`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CriteriaError;

// ============================================================================
// Closed vocabularies
// ============================================================================

/// Kind of clinical fact a leaf criterion describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ClinicalEntityType {
    Person,
    Condition,
    Procedure,
    Medication,
    Observation,
}

impl ClinicalEntityType {
    /// All entity types in declaration order
    pub const ALL: [ClinicalEntityType; 5] = [
        Self::Person,
        Self::Condition,
        Self::Procedure,
        Self::Medication,
        Self::Observation,
    ];

    /// Wire name of the entity type
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Condition => "CONDITION",
            Self::Procedure => "PROCEDURE",
            Self::Medication => "MEDICATION",
            Self::Observation => "OBSERVATION",
        }
    }

    /// FHIR resource type that carries facts of this kind
    pub const fn resource_type(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Condition => "Condition",
            Self::Procedure => "Procedure",
            Self::Medication => "MedicationStatement",
            Self::Observation => "Observation",
        }
    }
}

impl fmt::Display for ClinicalEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClinicalEntityType {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CriteriaError::unknown_entity_type(s))
    }
}

impl From<ClinicalEntityType> for String {
    fn from(value: ClinicalEntityType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for ClinicalEntityType {
    type Error = CriteriaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Well-known attribute address within a clinical resource
///
/// Each tag maps to a dotted path over the resource's JSON projection and
/// records whether the value at that path is drawn from a controlled
/// terminology. Coded paths are compared against pre-expanded codes, never
/// against user-supplied operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ValueLocationPath {
    PersonId,
    PersonGender,
    PersonDob,
    ConditionCode,
    ProcedureCode,
    MedicationCode,
    ObservationCode,
    ObservationValue,
}

impl ValueLocationPath {
    /// All known paths in declaration order
    pub const ALL: [ValueLocationPath; 8] = [
        Self::PersonId,
        Self::PersonGender,
        Self::PersonDob,
        Self::ConditionCode,
        Self::ProcedureCode,
        Self::MedicationCode,
        Self::ObservationCode,
        Self::ObservationValue,
    ];

    /// Wire tag of the path
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PersonId => "PERSON_ID",
            Self::PersonGender => "PERSON_GENDER",
            Self::PersonDob => "PERSON_DOB",
            Self::ConditionCode => "CONDITION_CODE",
            Self::ProcedureCode => "PROCEDURE_CODE",
            Self::MedicationCode => "MEDICATION_CODE",
            Self::ObservationCode => "OBSERVATION_CODE",
            Self::ObservationValue => "OBSERVATION_VALUE",
        }
    }

    /// Dotted attribute path into the resource JSON
    pub const fn path(&self) -> &'static str {
        match self {
            Self::PersonId => "id",
            Self::PersonGender => "gender",
            Self::PersonDob => "birthDate",
            Self::ConditionCode | Self::ProcedureCode | Self::ObservationCode => {
                "code.coding.code"
            }
            Self::MedicationCode => "medicationCodeableConcept.coding.code",
            Self::ObservationValue => "valueString",
        }
    }

    /// Whether values at this path are terminology-bound
    pub const fn is_coded(&self) -> bool {
        matches!(
            self,
            Self::ConditionCode | Self::ProcedureCode | Self::MedicationCode | Self::ObservationCode
        )
    }

    /// Entity type whose resources carry this path
    pub const fn entity_type(&self) -> ClinicalEntityType {
        match self {
            Self::PersonId | Self::PersonGender | Self::PersonDob => ClinicalEntityType::Person,
            Self::ConditionCode => ClinicalEntityType::Condition,
            Self::ProcedureCode => ClinicalEntityType::Procedure,
            Self::MedicationCode => ClinicalEntityType::Medication,
            Self::ObservationCode | Self::ObservationValue => ClinicalEntityType::Observation,
        }
    }
}

impl fmt::Display for ValueLocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueLocationPath {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CriteriaError::unknown_path(s))
    }
}

impl From<ValueLocationPath> for String {
    fn from(value: ValueLocationPath) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for ValueLocationPath {
    type Error = CriteriaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Number of operands a relation binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandArity {
    Exactly(usize),
    AtLeast(usize),
}

impl OperandArity {
    /// Check an operand count against this arity
    pub const fn accepts(&self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == *n,
            Self::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for OperandArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {}", n),
            Self::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Relation a value predicate applies between a resource value and its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ValueRelation {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    In,
    Between,
}

impl ValueRelation {
    pub const ALL: [ValueRelation; 7] = [
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Eq,
        Self::In,
        Self::Between,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Eq => "EQ",
            Self::In => "IN",
            Self::Between => "BETWEEN",
        }
    }

    /// Operand count the relation requires
    pub const fn arity(&self) -> OperandArity {
        match self {
            Self::Between => OperandArity::Exactly(2),
            Self::In => OperandArity::AtLeast(1),
            _ => OperandArity::Exactly(1),
        }
    }

    /// Relations that only bind over ordered (numeric and date) domains
    pub const fn is_ordering(&self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte | Self::Between)
    }
}

impl fmt::Display for ValueRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueRelation {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CriteriaError::unknown_relation(s))
    }
}

impl From<ValueRelation> for String {
    fn from(value: ValueRelation) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for ValueRelation {
    type Error = CriteriaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Boolean combinator applied by a logical node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LogicalOperator {
    /// All children match
    And,
    /// No child matches
    Not,
    /// At least `k` children match
    MinOr,
    /// At most `k` children match
    MaxOr,
}

impl LogicalOperator {
    pub const ALL: [LogicalOperator; 4] = [Self::And, Self::Not, Self::MinOr, Self::MaxOr];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Not => "NOT",
            Self::MinOr => "MIN_OR",
            Self::MaxOr => "MAX_OR",
        }
    }

    /// Whether the numeric modifier participates in this operator
    pub const fn uses_modifier(&self) -> bool {
        matches!(self, Self::MinOr | Self::MaxOr)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalOperator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CriteriaError::unsupported_logical_op(s))
    }
}

impl From<LogicalOperator> for String {
    fn from(value: LogicalOperator) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for LogicalOperator {
    type Error = CriteriaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Value predicates
// ============================================================================

/// One `(path, relation, operands)` assertion over a resource attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePredicate {
    /// Attribute the predicate inspects
    pub value_path: ValueLocationPath,
    /// Relation between the attribute value and the operands
    #[serde(rename = "reln")]
    pub relation: ValueRelation,
    /// User-supplied operands
    #[serde(default)]
    pub values: Vec<String>,
    /// Terminology expansion of each operand; required on coded paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_codes: Option<Vec<Vec<String>>>,
}

impl ValuePredicate {
    /// Create a predicate over an uncoded path
    pub fn new<I, S>(value_path: ValueLocationPath, relation: ValueRelation, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value_path,
            relation,
            values: values.into_iter().map(Into::into).collect(),
            expanded_codes: None,
        }
    }

    /// Create a predicate whose operands already carry their terminology expansion
    pub fn coded<I, S>(
        value_path: ValueLocationPath,
        relation: ValueRelation,
        values: I,
        expanded_codes: Vec<Vec<String>>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded_codes: Some(expanded_codes),
            ..Self::new(value_path, relation, values)
        }
    }
}

// ============================================================================
// Criterion nodes
// ============================================================================

/// Identity and descriptive fields shared by every criterion node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Stable node identity; key into the precomputed score table
    #[serde(rename = "nodeUID")]
    pub node_uid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeInfo {
    /// Node info with a freshly generated identity
    pub fn new() -> Self {
        Self::with_uid(Uuid::new_v4())
    }

    /// Node info with a caller-chosen identity
    pub fn with_uid(node_uid: Uuid) -> Self {
        Self {
            node_uid,
            title: None,
            description: None,
        }
    }
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// An individual clinical fact shape, e.g. a diagnosis or a drug exposure
///
/// A resource matches iff every component predicate matches that same
/// resource. For scoring the entity is one atomic unit; per-component
/// weighting is modelled with a [`LogicalCriterion`] over entity criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCriterion {
    #[serde(flatten)]
    pub node: NodeInfo,
    /// Entity kind; metadata for upstream extraction
    #[serde(rename = "type")]
    pub entity_type: ClinicalEntityType,
    #[serde(default)]
    pub components: Vec<ValuePredicate>,
}

/// Boolean combinator over one or more child criteria
///
/// `numericModifier` is the `k` of MIN_OR / MAX_OR and is ignored by AND / NOT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalCriterion {
    #[serde(flatten)]
    pub node: NodeInfo,
    #[serde(rename = "type")]
    pub operator: LogicalOperator,
    #[serde(default)]
    pub numeric_modifier: i32,
    #[serde(default)]
    pub children: Vec<Criterion>,
}

/// Discriminator of the two node shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Logical,
    Entity,
}

impl NodeType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Logical => "LOGICAL",
            Self::Entity => "ENTITY",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the criterion tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType")]
pub enum Criterion {
    #[serde(rename = "ENTITY")]
    Entity(EntityCriterion),
    #[serde(rename = "LOGICAL")]
    Logical(LogicalCriterion),
}

impl Criterion {
    /// Create an entity leaf with a fresh node identity
    pub fn entity(entity_type: ClinicalEntityType, components: Vec<ValuePredicate>) -> Self {
        Self::Entity(EntityCriterion {
            node: NodeInfo::new(),
            entity_type,
            components,
        })
    }

    /// Create a logical node with a fresh node identity
    pub fn logical(operator: LogicalOperator, numeric_modifier: i32, children: Vec<Criterion>) -> Self {
        Self::Logical(LogicalCriterion {
            node: NodeInfo::new(),
            operator,
            numeric_modifier,
            children,
        })
    }

    /// AND over `children`
    pub fn and(children: Vec<Criterion>) -> Self {
        Self::logical(LogicalOperator::And, 0, children)
    }

    /// NOT over `children`
    pub fn not(children: Vec<Criterion>) -> Self {
        Self::logical(LogicalOperator::Not, 0, children)
    }

    /// MIN_OR(k) over `children`
    pub fn min_or(k: i32, children: Vec<Criterion>) -> Self {
        Self::logical(LogicalOperator::MinOr, k, children)
    }

    /// MAX_OR(k) over `children`
    pub fn max_or(k: i32, children: Vec<Criterion>) -> Self {
        Self::logical(LogicalOperator::MaxOr, k, children)
    }

    /// Replace the node identity
    pub fn with_uid(mut self, node_uid: Uuid) -> Self {
        self.node_mut().node_uid = node_uid;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.node_mut().title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.node_mut().description = Some(description.into());
        self
    }

    pub fn node(&self) -> &NodeInfo {
        match self {
            Self::Entity(e) => &e.node,
            Self::Logical(l) => &l.node,
        }
    }

    fn node_mut(&mut self) -> &mut NodeInfo {
        match self {
            Self::Entity(e) => &mut e.node,
            Self::Logical(l) => &mut l.node,
        }
    }

    pub fn node_uid(&self) -> Uuid {
        self.node().node_uid
    }

    pub fn title(&self) -> Option<&str> {
        self.node().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.node().description.as_deref()
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Entity(_) => NodeType::Entity,
            Self::Logical(_) => NodeType::Logical,
        }
    }

    /// Direct children; empty for entity leaves
    pub fn children(&self) -> &[Criterion] {
        match self {
            Self::Entity(_) => &[],
            Self::Logical(l) => &l.children,
        }
    }

    /// Depth-first, pre-order iterator over this node and its descendants
    pub fn iter(&self) -> CriterionIter<'_> {
        CriterionIter { stack: vec![self] }
    }

    /// Entity leaves in depth-first pre-order
    pub fn leaves(&self) -> impl Iterator<Item = &EntityCriterion> {
        self.iter().filter_map(|c| match c {
            Criterion::Entity(e) => Some(e),
            Criterion::Logical(_) => None,
        })
    }

    /// Find a node by identity
    pub fn find(&self, node_uid: Uuid) -> Option<&Criterion> {
        self.iter().find(|c| c.node_uid() == node_uid)
    }
}

/// Pre-order traversal over a criterion tree
pub struct CriterionIter<'a> {
    stack: Vec<&'a Criterion>,
}

impl<'a> Iterator for CriterionIter<'a> {
    type Item = &'a Criterion;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition_leaf(code: &str) -> Criterion {
        Criterion::entity(
            ClinicalEntityType::Condition,
            vec![ValuePredicate::coded(
                ValueLocationPath::ConditionCode,
                ValueRelation::In,
                [code],
                vec![vec![code.to_string()]],
            )],
        )
    }

    #[test]
    fn test_path_catalogue() {
        assert_eq!(ValueLocationPath::PersonDob.path(), "birthDate");
        assert_eq!(
            ValueLocationPath::MedicationCode.path(),
            "medicationCodeableConcept.coding.code"
        );
        assert!(ValueLocationPath::ObservationCode.is_coded());
        assert!(!ValueLocationPath::ObservationValue.is_coded());
        assert_eq!(
            ValueLocationPath::ObservationValue.entity_type(),
            ClinicalEntityType::Observation
        );
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert_eq!(
            "CONDITION_ONSET".parse::<ValueLocationPath>(),
            Err(CriteriaError::unknown_path("CONDITION_ONSET"))
        );
        assert_eq!(
            "XOR".parse::<LogicalOperator>(),
            Err(CriteriaError::unsupported_logical_op("XOR"))
        );
        assert!("RANGE".parse::<ValueRelation>().is_err());
    }

    #[test]
    fn test_entity_type_parse_is_case_insensitive() {
        assert_eq!(
            "condition".parse::<ClinicalEntityType>(),
            Ok(ClinicalEntityType::Condition)
        );
        assert_eq!(ClinicalEntityType::Medication.resource_type(), "MedicationStatement");
    }

    #[test]
    fn test_arity() {
        assert!(ValueRelation::Between.arity().accepts(2));
        assert!(!ValueRelation::Between.arity().accepts(1));
        assert!(ValueRelation::In.arity().accepts(3));
        assert!(!ValueRelation::In.arity().accepts(0));
        assert!(ValueRelation::Lt.arity().accepts(1));
    }

    #[test]
    fn test_preorder_iteration() {
        let a = condition_leaf("A");
        let b = condition_leaf("B");
        let c = condition_leaf("C");
        let (a_id, b_id, c_id) = (a.node_uid(), b.node_uid(), c.node_uid());
        let inner = Criterion::min_or(1, vec![b, c]);
        let inner_id = inner.node_uid();
        let root = Criterion::and(vec![a, inner]);

        let order: Vec<Uuid> = root.iter().map(Criterion::node_uid).collect();
        assert_eq!(order, vec![root.node_uid(), a_id, inner_id, b_id, c_id]);

        let leaves: Vec<Uuid> = root.leaves().map(|e| e.node.node_uid).collect();
        assert_eq!(leaves, vec![a_id, b_id, c_id]);

        assert_eq!(root.find(c_id).map(Criterion::node_type), Some(NodeType::Entity));
        assert!(root.find(Uuid::nil()).is_none());
    }

    #[test]
    fn test_builder_metadata() {
        let uid = Uuid::new_v4();
        let node = condition_leaf("A")
            .with_uid(uid)
            .with_title("Diabetes")
            .with_description("Type 2 diabetes mellitus");
        assert_eq!(node.node_uid(), uid);
        assert_eq!(node.title(), Some("Diabetes"));
        assert_eq!(node.description(), Some("Type 2 diabetes mellitus"));
        assert!(node.children().is_empty());
    }
}
