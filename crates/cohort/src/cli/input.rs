//! Loading of trees, options and score tables from disk

use anyhow::{Context, Result};
use cohort_criteria::{Criterion, ScoreTable, score_table_from_json};
use cohort_eval::{CriterionEvaluator, EvaluationOptions};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Read a file to a string with the file name in the error
pub fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} file: {}", what, path.display()))
}

/// Load and decode a criterion tree
pub fn load_tree(path: &Path) -> Result<Criterion> {
    let json = read_file(path, "criterion")?;
    Criterion::from_json(&json).with_context(|| format!("Failed to parse criterion tree: {}", path.display()))
}

/// Load evaluation options, falling back to defaults
pub fn load_options(path: Option<&Path>) -> Result<EvaluationOptions> {
    let Some(path) = path else {
        return Ok(EvaluationOptions::default());
    };
    let json = read_file(path, "options")?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse options file: {}", path.display()))
}

/// Build an evaluator from an optional options file
pub fn evaluator(path: Option<&Path>) -> Result<CriterionEvaluator> {
    Ok(CriterionEvaluator::with_options(load_options(path)?))
}

/// Load one patient's score table
pub fn load_score_table(path: &Path) -> Result<ScoreTable> {
    let json = read_file(path, "score table")?;
    score_table_from_json(&json).with_context(|| format!("Failed to parse score table: {}", path.display()))
}

/// Load score tables for many patients, keyed by patient id in file order
pub fn load_patient_tables(path: &Path) -> Result<IndexMap<String, ScoreTable>> {
    let json = read_file(path, "patients")?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse patient score tables: {}", path.display()))
}
