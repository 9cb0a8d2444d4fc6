//! Rank command implementation

use super::{input, output};
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Configuration for rank command
pub struct RankConfig {
    pub tree: PathBuf,
    pub patients: PathBuf,
    pub limit: Option<usize>,
    pub options: Option<PathBuf>,
    pub verbose: bool,
    pub output_format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Rank every patient's score table, best first
pub fn rank_patients(config: &RankConfig) -> Result<Value> {
    let tree = input::load_tree(&config.tree)?;
    let tables = input::load_patient_tables(&config.patients)?;
    let evaluator = input::evaluator(config.options.as_deref())?;

    if config.verbose {
        eprintln!("Ranking {} patient(s) against {}", tables.len(), config.tree.display());
    }

    let ranked = evaluator
        .rank_candidates(&tree, &tables)
        .with_context(|| format!("Failed to rank {}", config.patients.display()))?;

    let limit = config.limit.unwrap_or(ranked.len());
    let rows = ranked
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, candidate)| {
            json!({
                "rank": index + 1,
                "patientId": candidate.patient_id,
                "score": candidate.score,
                "missingLeaves": candidate.diagnostics.missing_leaves,
                "clamped": candidate.diagnostics.non_finite_clamped,
            })
        })
        .collect();

    Ok(Value::Array(rows))
}

/// Execute the rank command
pub fn execute(config: RankConfig) -> Result<()> {
    let report = rank_patients(&config)?;
    output::print_output(&report, config.output_format, config.output_file.as_deref())
}
