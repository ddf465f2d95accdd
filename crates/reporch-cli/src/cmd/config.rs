use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use reporch_core::config::{Config, ConfigSource, WarnLevel};
use reporch_core::session::Session;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show {
        /// Config file (.json/.yaml) or inline JSON (default: ./reporch.json)
        config: Option<String>,
    },

    /// Check the config for fatal errors and common mistakes
    Validate {
        /// Config file (.json/.yaml) or inline JSON (default: ./reporch.json)
        config: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show { config } => show(config.as_deref(), json),
        ConfigSubcommand::Validate { config } => validate(config.as_deref(), json),
    }
}

fn load(arg: Option<&str>) -> anyhow::Result<(Config, ConfigSource)> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    Config::resolve(arg, &cwd).context("failed to load config")
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(arg: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, source) = load(arg)?;

    if json {
        let value = serde_json::json!({
            "source": source,
            "config": config,
        });
        print_json(&value)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(arg: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, _) = load(arg)?;
    let warnings = config.validate();
    Session::assemble(config).context("invalid configuration")?;

    if json {
        let value = serde_json::json!({
            "valid": true,
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Info => "info",
                WarnLevel::Warning => "warning",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    Ok(())
}
