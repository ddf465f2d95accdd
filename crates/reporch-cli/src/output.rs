use reporch_core::engine::RunReport;
use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Label/value rows describing a finished run.
pub fn report_fields(
    report: &RunReport,
    repo_dir: &Path,
    snapshot: &Path,
) -> Vec<(&'static str, String)> {
    vec![
        ("repository", repo_dir.display().to_string()),
        ("ticks", report.ticks.to_string()),
        ("commits", report.commits.to_string()),
        ("merges", report.merges.to_string()),
        ("features", report.features_opened.to_string()),
        ("model", report.model.to_string()),
        ("snapshot", snapshot.display().to_string()),
    ]
}

/// Print rows as `label  value` with labels padded to a common width.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("{label:<width$}  {value}");
    }
}
