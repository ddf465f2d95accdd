use crate::output::{print_fields, print_json, report_fields};
use anyhow::Context;
use chrono::Utc;
use reporch_core::backend::{GitCli, Recorder};
use reporch_core::config::Config;
use reporch_core::engine::{self, RunReport};
use reporch_core::paths::DEFAULT_SNAPSHOT_FILE;
use reporch_core::session::Session;
use std::path::{Path, PathBuf};

pub struct RunArgs<'a> {
    pub config: Option<&'a str>,
    pub snapshot: Option<&'a Path>,
    pub repo_dir: Option<&'a str>,
    pub dry_run: bool,
}

pub fn run(args: RunArgs<'_>, json: bool) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let (mut config, source) =
        Config::resolve(args.config, &cwd).context("failed to load config")?;
    if let Some(dir) = args.repo_dir {
        config.repo_dir = dir.to_string();
    }
    for w in config.validate() {
        tracing::warn!("{}", w.message);
    }
    tracing::info!(source = ?source, "config loaded");

    let mut session = Session::assemble(config).context("invalid configuration")?;
    let repo_dir = session.repo_dir();
    let end = Utc::now();

    let report: RunReport = if args.dry_run {
        let (_, report) = engine::run::<Recorder>(&mut session, end)?;
        report
    } else {
        let (_, report) = engine::run::<GitCli>(&mut session, end)
            .with_context(|| format!("failed to build repository at {}", repo_dir.display()))?;
        report
    };

    let snapshot_path: PathBuf = args
        .snapshot
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.join(DEFAULT_SNAPSHOT_FILE));
    let snapshot = session.finalize(&report.model);
    snapshot
        .save(&snapshot_path)
        .with_context(|| format!("failed to write {}", snapshot_path.display()))?;

    if json {
        let value = serde_json::json!({
            "repo_dir": repo_dir,
            "dry_run": args.dry_run,
            "snapshot": snapshot_path,
            "report": report,
        });
        print_json(&value)?;
    } else {
        print_fields(&report_fields(&report, &repo_dir, &snapshot_path));
        if args.dry_run {
            println!("\n(dry run: no repository was written)");
        }
    }
    Ok(())
}
