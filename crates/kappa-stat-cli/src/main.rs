//! kappa-stat CLI - inter-rater agreement statistics

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

mod commands;

const INPUT_FORMAT_HELP: &str = "\
The input file holds one subject per line and one rater per column.
Columns are separated by spaces or tabs. No header line and no text is
allowed. Ratings are truncated to integer category labels.

Weight schemes for Cohen's kappa (k categories, i and j category indices):
  linear:    1 - |i - j| / (k - 1)
  quadratic: 1 - ((i - j) / (k - 1))^2
  identity:  1 if i = j, else 0 (unweighted kappa)";

/// Inter-rater agreement statistics (Fleiss' and Cohen's kappa).
#[derive(Parser)]
#[command(name = "kappa-stat")]
#[command(author, version, about, long_about = None, after_long_help = INPUT_FORMAT_HELP)]
struct Cli {
    /// Verbose output (debug logging to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a kappa statistic
    Compute {
        #[command(flatten)]
        input: InputArgs,

        /// Compute the standard deviation
        #[arg(long)]
        std: bool,

        /// Kappa to compare against; selects the non-null standard deviation
        #[arg(long, allow_hyphen_values = true)]
        cmp: Option<f64>,

        /// Output level: kappa, all or ALL
        #[arg(short, long, default_value = "all")]
        out: String,

        /// Number of decimals in the output
        #[arg(short, long, default_value_t = kappa_stat::report::DEFAULT_PRECISION)]
        precision: usize,

        /// Print the full result as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export the agreement count table as CSV
    Counts {
        #[command(flatten)]
        input: InputArgs,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments shared by every command that reads a rating table.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input rating table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Kappa test: fleiss (many raters) or cohen (two raters, weighted)
    #[arg(short, long)]
    pub test: String,

    /// Zero-based rater columns; for cohen the first is rater 1
    #[arg(short, long, num_args = 1.., required = true)]
    pub columns: Vec<usize>,

    /// Cohen weight scheme: linear, quadratic or identity
    #[arg(short, long, default_value = "linear")]
    pub weights: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Compute { input, std, cmp, out, precision, json } => {
            commands::compute::run(&input, std, cmp, &out, precision, json)
        }
        Commands::Counts { input, output } => commands::counts::run(&input, output),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_status(&err))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Distinct exit status per failure kind.
fn exit_status(err: &anyhow::Error) -> u8 {
    let Some(err) = err.downcast_ref::<kappa_stat::Error>() else {
        return 1;
    };
    match err {
        kappa_stat::Error::Load { .. } => 2,
        kappa_stat::Error::Validation { .. } => 3,
        kappa_stat::Error::ModeMismatch { .. } => 4,
        kappa_stat::Error::UnknownWeightScheme(_)
        | kappa_stat::Error::UnknownTest(_)
        | kappa_stat::Error::UnknownVerbosity(_) => 5,
        kappa_stat::Error::DegenerateKappa { .. } => 6,
        kappa_stat::Error::InsufficientData { .. } => 7,
        _ => 1,
    }
}
