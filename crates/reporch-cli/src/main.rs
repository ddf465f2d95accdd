mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reporch",
    about = "Synthesize a reproducible git history of feature branches and merges",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log run progress (RUST_LOG still applies)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the repository and write the model snapshot
    Run {
        /// Config file (.json/.yaml) or inline JSON (default: ./reporch.json)
        config: Option<String>,

        /// Where to write the snapshot (default: ./model.yaml)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Override repo_dir from the config
        #[arg(long, env = "REPORCH_REPO_DIR")]
        repo_dir: Option<String>,

        /// Simulate in memory without touching git
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            snapshot,
            repo_dir,
            dry_run,
        } => cmd::run::run(
            cmd::run::RunArgs {
                config: config.as_deref(),
                snapshot: snapshot.as_deref(),
                repo_dir: repo_dir.as_deref(),
                dry_run,
            },
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
