//! Score command implementation

use super::{input, output};
use anyhow::{Context, Result};
use cohort_eval::ScoreContext;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Configuration for score command
pub struct ScoreConfig {
    pub tree: PathBuf,
    pub scores: PathBuf,
    pub options: Option<PathBuf>,
    pub verbose: bool,
    pub output_format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Score one patient's table and report the root score with diagnostics
pub fn score_table(config: &ScoreConfig) -> Result<Value> {
    let tree = input::load_tree(&config.tree)?;
    let table = input::load_score_table(&config.scores)?;
    let evaluator = input::evaluator(config.options.as_deref())?;

    let mut ctx = ScoreContext::new(&table);
    let score = evaluator
        .score_with_context(&tree, &mut ctx)
        .with_context(|| format!("Failed to score {}", config.tree.display()))?;

    Ok(json!({
        "nodeUID": tree.node_uid().to_string(),
        "score": score,
        "diagnostics": ctx.diagnostics(),
    }))
}

/// Execute the score command
pub fn execute(config: ScoreConfig) -> Result<()> {
    let report = score_table(&config)?;

    if config.verbose {
        let missing = report["diagnostics"]["missingLeaves"].as_u64().unwrap_or_default();
        if missing > 0 {
            eprintln!(
                "{}",
                output::format_warning(&format!("{} leaf score(s) missing from {}", missing, config.scores.display()))
            );
        }
    }

    output::print_output(&report, config.output_format, config.output_file.as_deref())
}
