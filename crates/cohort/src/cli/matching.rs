//! Match command implementation

use super::{input, output};
use anyhow::{Context, Result};
use cohort_eval::RawResource;
use log::warn;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Configuration for match command
pub struct MatchConfig {
    pub tree: PathBuf,
    pub resources: Vec<PathBuf>,
    pub options: Option<PathBuf>,
    pub verbose: bool,
    pub output_format: output::OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Match every resource against the tree and report one row per resource
///
/// A resource file holds one resource or an array of resources. A file that
/// is not valid JSON is reported as a single non-matching resource.
pub fn match_resources(config: &MatchConfig) -> Result<Value> {
    let tree = input::load_tree(&config.tree)?;
    let evaluator = input::evaluator(config.options.as_deref())?;

    if config.verbose {
        eprintln!("Matching {} resource file(s) against {}", config.resources.len(), config.tree.display());
    }

    let mut rows = Vec::new();
    for path in &config.resources {
        let text = input::read_file(path, "resource")?;
        let label = path.display().to_string();

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(resources)) => {
                for (index, resource) in resources.iter().enumerate() {
                    let matched = evaluator
                        .matches(&tree, resource)
                        .with_context(|| format!("Failed to evaluate {}[{}]", label, index))?;
                    rows.push(row(format!("{}[{}]", label, index), resource, matched));
                }
            }
            Ok(resource) => {
                let matched = evaluator
                    .matches(&tree, &resource)
                    .with_context(|| format!("Failed to evaluate {}", label))?;
                rows.push(row(label, &resource, matched));
            }
            Err(e) => {
                warn!("{} is not valid JSON: {}", label, e);
                let matched = evaluator
                    .matches(&tree, &RawResource::new(text))
                    .with_context(|| format!("Failed to evaluate {}", label))?;
                rows.push(json!({"resource": label, "id": Value::Null, "matched": matched}));
            }
        }
    }

    Ok(Value::Array(rows))
}

fn row(label: String, resource: &Value, matched: bool) -> Value {
    json!({
        "resource": label,
        "id": resource.get("id").cloned().unwrap_or(Value::Null),
        "matched": matched,
    })
}

/// Execute the match command
pub fn execute(config: MatchConfig) -> Result<()> {
    let report = match_resources(&config)?;
    output::print_output(&report, config.output_format, config.output_file.as_deref())?;

    if config.verbose {
        let matched = report
            .as_array()
            .map(|rows| rows.iter().filter(|r| r["matched"] == Value::Bool(true)).count())
            .unwrap_or_default();
        eprintln!("{}", output::format_success(&format!("{} resource(s) matched", matched)));
    }
    Ok(())
}
