//! Value predicate comparators
//!
//! Each collected value is tried against the operands in three domains, in
//! order: numeric, date, then string/coded. The first domain in which the
//! value (and the operands the relation needs) coerce decides the outcome
//! for that value.
//!
//! | Relation  | Numeric / date        | String / coded              |
//! |-----------|-----------------------|-----------------------------|
//! | `LT`..`GTE` | ordered comparison  | error                       |
//! | `BETWEEN` | `lo <= v < hi`        | error                       |
//! | `EQ`      | `v == operands[0]`    | case-insensitive equality   |
//! | `IN`      | membership            | case-insensitive membership |
//!
//! Coded `IN` / `EQ` test membership in the expanded codes as text only;
//! codes are identifiers, so `0123` and `123` are different codes.

use chrono::NaiveDate;
use cohort_criteria::{ValuePredicate, ValueRelation};
use log::trace;
use serde_json::Value;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::engine::CriterionEvaluator;
use crate::error::{EvalError, EvalResult};

/// Parse a value as a finite double, ignoring surrounding whitespace
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a `YYYY-MM-DD` prefix as a calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_and_remainder(s.trim(), "%Y-%m-%d")
        .ok()
        .map(|(date, _)| date)
}

/// Milliseconds since the epoch at midnight UTC of a date's value
pub fn parse_epoch_millis(s: &str) -> Option<i64> {
    let midnight = parse_date(s)?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis())
}

/// Apply an ordered relation to already-coerced operands
fn compare<T: PartialOrd>(relation: ValueRelation, value: &T, targets: &[T]) -> bool {
    match relation {
        ValueRelation::Lt => targets.first().is_some_and(|t| value < t),
        ValueRelation::Lte => targets.first().is_some_and(|t| value <= t),
        ValueRelation::Gt => targets.first().is_some_and(|t| value > t),
        ValueRelation::Gte => targets.first().is_some_and(|t| value >= t),
        ValueRelation::Eq => targets.first().is_some_and(|t| value == t),
        ValueRelation::In => targets.iter().any(|t| value == t),
        ValueRelation::Between => match targets {
            [lo, hi, ..] => lo <= value && value < hi,
            _ => false,
        },
    }
}

fn numeric_match(relation: ValueRelation, value: &str, targets: &[&str]) -> Option<bool> {
    let value = parse_number(value)?;
    let targets: SmallVec<[f64; 4]> = targets.iter().map(|t| parse_number(t)).collect::<Option<_>>()?;
    Some(compare(relation, &value, &targets))
}

fn date_match(relation: ValueRelation, value: &str, targets: &[&str]) -> Option<bool> {
    let value = parse_epoch_millis(value)?;
    let targets: SmallVec<[i64; 4]> = if relation == ValueRelation::In {
        // Unparseable IN operands are dropped
        targets.iter().filter_map(|t| parse_epoch_millis(t)).collect()
    } else {
        targets.iter().map(|t| parse_epoch_millis(t)).collect::<Option<_>>()?
    };
    Some(compare(relation, &value, &targets))
}

fn string_match(relation: ValueRelation, value: &str, targets: &[&str]) -> EvalResult<bool> {
    let folded = value.to_lowercase();
    match relation {
        ValueRelation::Eq => Ok(targets.first().is_some_and(|t| t.to_lowercase() == folded)),
        ValueRelation::In => Ok(targets.iter().any(|t| t.to_lowercase() == folded)),
        _ => Err(EvalError::unsupported_relation(relation, "string", value)),
    }
}

/// Case-insensitive membership of a code in an expansion
pub fn match_code(value: &str, codes: &[&str]) -> bool {
    let folded = value.to_lowercase();
    codes.iter().any(|code| code.to_lowercase() == folded)
}

/// Match one collected value in the first domain that applies
pub fn match_value(relation: ValueRelation, value: &str, targets: &[&str]) -> EvalResult<bool> {
    if let Some(matched) = numeric_match(relation, value, targets) {
        return Ok(matched);
    }
    if let Some(matched) = date_match(relation, value, targets) {
        return Ok(matched);
    }
    string_match(relation, value, targets)
}

impl CriterionEvaluator {
    /// Evaluate one predicate of entity `node_uid` against a resource
    ///
    /// The predicate holds iff any value found at its path matches.
    pub fn match_predicate(&self, node_uid: Uuid, predicate: &ValuePredicate, resource: &Value) -> EvalResult<bool> {
        let path = self.resolver().resolve(predicate.value_path);
        let values = path.collect(resource);

        let membership = path.is_coded() && matches!(predicate.relation, ValueRelation::In | ValueRelation::Eq);
        let targets = comparison_targets(node_uid, predicate, membership)?;

        let mut matched = false;
        for value in &values {
            let hit = if membership {
                match_code(value, &targets)
            } else {
                match_value(predicate.relation, value, &targets)?
            };
            if hit {
                matched = true;
                break;
            }
        }

        trace!(
            "Predicate {} {} {:?} over {} values matched={}",
            predicate.value_path,
            predicate.relation,
            predicate.values,
            values.len(),
            matched
        );
        Ok(matched)
    }
}

/// Operands a predicate compares against
///
/// Coded `IN` uses every expanded code and coded `EQ` the expansion of the
/// first operand; every other case uses the literal operands.
fn comparison_targets(
    node_uid: Uuid,
    predicate: &ValuePredicate,
    membership: bool,
) -> EvalResult<SmallVec<[&str; 8]>> {
    if !membership {
        return Ok(predicate.values.iter().map(String::as_str).collect());
    }

    let expanded = predicate
        .expanded_codes
        .as_ref()
        .ok_or(EvalError::MissingExpandedCodes {
            node_uid,
            path: predicate.value_path,
        })?;

    Ok(match predicate.relation {
        ValueRelation::Eq => expanded
            .first()
            .map(|row| row.iter().map(String::as_str).collect())
            .unwrap_or_default(),
        _ => expanded.iter().flatten().map(String::as_str).collect(),
    })
}
