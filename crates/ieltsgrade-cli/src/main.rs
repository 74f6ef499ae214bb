//! ieltsgrade CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "ieltsgrade",
    version,
    about = "IELTS attempt grading and statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade attempt records and write reports
    Grade {
        /// Path to an attempt record (.json/.toml) or a directory of records
        #[arg(long)]
        attempt: PathBuf,

        /// Max attempts graded concurrently (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all (overrides config)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the per-question review for one attempt
    Review {
        /// Path to an attempt record
        #[arg(long)]
        attempt: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate attempt records
    Validate {
        /// Path to an attempt record or directory
        #[arg(long)]
        attempt: PathBuf,
    },

    /// Compare two grade reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change threshold in percentage points
        #[arg(long, default_value = "5")]
        threshold: u32,

        /// Exit code 1 if any task declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example attempt
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ieltsgrade=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            attempt,
            parallelism,
            output,
            format,
            config,
        } => commands::grade::execute(attempt, parallelism, output, format, config).await,
        Commands::Review { attempt, format } => commands::review::execute(attempt, format),
        Commands::Validate { attempt } => commands::validate::execute(attempt),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
