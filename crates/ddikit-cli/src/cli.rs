use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ddikit CLI - Chemical-knowledge annotation and evaluation utilities for drug-drug interaction prediction models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score molecules against the atom-contribution LogP table and print per-atom labels.
    Score(ScoreArgs),
    /// Annotate a dataset CSV with scaled per-atom knowledge labels.
    Annotate(AnnotateArgs),
    /// Compute epoch validation metrics from a predictions file.
    Eval(EvalArgs),
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// SMILES string to score.
    #[arg(
        short,
        long,
        value_name = "SMILES",
        conflicts_with = "input",
        required_unless_present = "input"
    )]
    pub smiles: Option<String>,

    /// Path to a file with one SMILES per line ('#' comment lines and blank lines skipped).
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Path to an external rule table in TSV format.
    /// The embedded Wildman-Crippen table is used when absent.
    #[arg(short, long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Print raw per-atom contributions instead of clipped labels.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the `annotate` subcommand.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Path to the dataset CSV with 'name' and 'smiles' columns.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the annotated dataset in JSON format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Scale factor applied to every atom label.
    #[arg(short, long, value_name = "FLOAT", default_value_t = 1.0)]
    pub factor: f64,

    /// Path to an external rule table in TSV format.
    /// The embedded Wildman-Crippen table is used when absent.
    #[arg(short, long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Cache the annotated dataset as a binary snapshot.
    /// A readable snapshot at this path skips re-annotation entirely.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `eval` subcommand.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Path to the predictions CSV with 'score' and 'label' columns
    /// (optional 'type' column for per-type reports).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the evaluation run configuration in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Zero-based epoch index the predictions belong to.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub epoch: u32,

    /// Append the epoch record to this JSON-lines history log.
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    // --- Config Overrides ---
    /// Override the dataset tag from the config file.
    #[arg(long, value_name = "NAME")]
    pub dataset: Option<String>,

    /// Override the aggregator tag from the config file.
    #[arg(long, value_name = "NAME")]
    pub aggregator: Option<String>,

    /// Override the cross-validation fold from the config file.
    #[arg(long, value_name = "INT")]
    pub fold: Option<u32>,

    /// Override the decision threshold from the config file.
    #[arg(long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    /// Append a per-interaction-type report block to this file. A
    /// directory gets a file name derived from the run tags. Requires a
    /// 'type' column in the predictions CSV.
    #[arg(long, value_name = "PATH")]
    pub type_report: Option<PathBuf>,
}
