//! Cohort command-line interface

use clap::{Parser, Subcommand};
use cohort::cli::output::{ColorMode, OutputFormat};
use cohort::cli::{matching, output, rank, score, validate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cohort criterion command-line tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "Cohort discovery criterion tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Evaluation options file (JSON)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match resources against a criterion tree
    Match {
        /// Criterion tree file (JSON)
        tree: PathBuf,

        /// Resource files (JSON object or array)
        #[arg(required = true)]
        resources: Vec<PathBuf>,
    },

    /// Score one patient's leaf score table
    Score {
        /// Criterion tree file (JSON)
        tree: PathBuf,

        /// Score table file keyed by leaf nodeUID
        scores: PathBuf,
    },

    /// Rank patients by composite score
    Rank {
        /// Criterion tree file (JSON)
        tree: PathBuf,

        /// Patient score tables keyed by patient id
        patients: PathBuf,

        /// Only report the best N patients
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Validate criterion tree files
    Validate {
        /// Criterion tree files to validate
        files: Vec<PathBuf>,

        /// Strict mode (entity path checks, warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },
}

/// Install the log subscriber; `COHORT_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("COHORT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Match { tree, resources } => matching::execute(matching::MatchConfig {
            tree,
            resources,
            options: cli.options,
            verbose: cli.verbose,
            output_format: cli.format,
            output_file: cli.output,
        }),

        Commands::Score { tree, scores } => score::execute(score::ScoreConfig {
            tree,
            scores,
            options: cli.options,
            verbose: cli.verbose,
            output_format: cli.format,
            output_file: cli.output,
        }),

        Commands::Rank { tree, patients, limit } => rank::execute(rank::RankConfig {
            tree,
            patients,
            limit,
            options: cli.options,
            verbose: cli.verbose,
            output_format: cli.format,
            output_file: cli.output,
        }),

        Commands::Validate { files, strict } => validate::validate(validate::ValidateConfig {
            files,
            strict,
            options: cli.options,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
