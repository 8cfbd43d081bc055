//! evalmatrix CLI: certification grading and attendance from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "evalmatrix",
    version,
    about = "Certification grading and attendance for training sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the evaluation matrix comes from.
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Session code on the training API
    #[arg(long, conflicts_with = "input", required_unless_present = "input")]
    session: Option<String>,

    /// Offline matrix JSON file instead of the API
    #[arg(long)]
    input: Option<PathBuf>,

    /// Session name shown on tables and exports
    #[arg(long)]
    name: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the evaluation matrix with averages and admission status
    Show {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Apply score edits and save them as one batch
    Grade {
        #[command(flatten)]
        source: SourceArgs,

        /// Score edit as MATRICULE:COMPETENCY=VALUE (empty value clears)
        #[arg(long = "set", value_name = "EDIT")]
        edits: Vec<String>,

        /// Validate and print the batch without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Export session results
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format: html, json, all
        #[arg(long, default_value = "html")]
        format: String,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Record attendance for one session day
    Attendance {
        /// Session code on the training API
        #[arg(long)]
        session: String,

        /// Day to record (YYYY-MM-DD); defaults to the first session day
        #[arg(long)]
        date: Option<String>,

        /// Mark everyone present before applying --absent
        #[arg(long)]
        all_present: bool,

        /// Matricules to mark absent (comma-separated)
        #[arg(long)]
        absent: Option<String>,

        /// Print the sheet without saving
        #[arg(long)]
        dry_run: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and an example offline matrix
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("evalmatrix_core=info,evalmatrix_client=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show { source } => commands::show::execute(source).await,
        Commands::Grade {
            source,
            edits,
            dry_run,
        } => commands::grade::execute(source, edits, dry_run).await,
        Commands::Export {
            source,
            format,
            output,
        } => commands::export::execute(source, format, output).await,
        Commands::Attendance {
            session,
            date,
            all_present,
            absent,
            dry_run,
            config,
        } => {
            commands::attendance::execute(session, date, all_present, absent, dry_run, config)
                .await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
