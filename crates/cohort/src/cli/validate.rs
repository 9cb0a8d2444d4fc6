//! Validate command implementation

use super::{input, output};
use anyhow::Result;
use cohort_criteria::Criterion;
use cohort_eval::CriterionEvaluator;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    pub strict: bool,
    pub options: Option<PathBuf>,
    pub verbose: bool,
}

/// Validation result for a single file
#[derive(Debug)]
pub struct ValidationResult {
    pub file: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate criterion tree files
///
/// Strict mode also rejects predicates on paths of another entity type and
/// treats warnings as errors.
pub fn validate(config: ValidateConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let results = validate_files(&config)?;

    let mut total_errors = 0;
    let mut total_warnings = 0;
    for result in &results {
        total_errors += result.errors.len();
        total_warnings += result.warnings.len();
        print_validation_result(result);
    }

    println!();
    if total_errors == 0 && total_warnings == 0 {
        println!(
            "{}",
            output::format_success(&format!("All {} file(s) validated successfully", results.len()))
        );
        return Ok(());
    }

    let mut summary = Vec::new();
    if total_errors > 0 {
        summary.push(format!("{} error(s)", total_errors).red().to_string());
    }
    if total_warnings > 0 {
        summary.push(format!("{} warning(s)", total_warnings).yellow().to_string());
    }

    if total_errors > 0 || (config.strict && total_warnings > 0) {
        anyhow::bail!("Validation failed: found {}", summary.join(", "));
    }
    eprintln!("{}", output::format_warning(&format!("Found {}", summary.join(", "))));
    Ok(())
}

/// Validate every configured file without printing
pub fn validate_files(config: &ValidateConfig) -> Result<Vec<ValidationResult>> {
    let mut options = input::load_options(config.options.as_deref())?;
    if config.strict {
        options.check_entity_paths = true;
    }
    let evaluator = CriterionEvaluator::with_options(options);

    Ok(config
        .files
        .iter()
        .map(|file| validate_file(file, &evaluator, config.verbose))
        .collect())
}

/// Validate a single file
fn validate_file(file: &Path, evaluator: &CriterionEvaluator, verbose: bool) -> ValidationResult {
    if verbose {
        eprintln!("Validating: {}", file.display());
    }

    let mut result = ValidationResult {
        file: file.to_path_buf(),
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let tree = match input::load_tree(file) {
        Ok(tree) => tree,
        Err(e) => {
            result.errors.push(format!("{:#}", e));
            return result;
        }
    };

    if verbose {
        eprintln!(
            "  Loaded criterion {} with {} leaves",
            tree.title().unwrap_or("(untitled)"),
            tree.leaves().count()
        );
    }

    if let Err(e) = evaluator.validate(&tree) {
        result.errors.push(e.to_string());
    }
    result.warnings = lint(&tree);
    result
}

/// Findings that do not break evaluation but usually indicate a mistake
pub fn lint(tree: &Criterion) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    for node in tree.iter() {
        if !seen.insert(node.node_uid()) {
            warnings.push(format!(
                "Duplicate nodeUID {}: score table entries will be shared",
                node.node_uid()
            ));
        }
        if let Criterion::Entity(entity) = node {
            if entity.components.is_empty() {
                warnings.push(format!(
                    "Entity {} has no components and matches every resource",
                    entity.node.node_uid
                ));
            }
        }
    }
    warnings
}

/// Print validation result for a file
fn print_validation_result(result: &ValidationResult) {
    let status = if result.success() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };

    println!("{} {}", status, result.file.display().to_string().cyan());

    for error in &result.errors {
        println!("  {}: {}", "error".red().bold(), error);
    }
    for warning in &result.warnings {
        println!("  {}: {}", "warning".yellow().bold(), warning);
    }
}
