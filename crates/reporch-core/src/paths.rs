use crate::error::{EvolveError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

/// Config file picked up from the working directory when no override is given.
pub const DEFAULT_CONFIG_FILE: &str = "reporch.json";
pub const DEFAULT_SNAPSHOT_FILE: &str = "model.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn default_config_path(cwd: &Path) -> PathBuf {
    cwd.join(DEFAULT_CONFIG_FILE)
}

pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// The repository destination must name something other than the filesystem
/// root or the current directory, because init wipes it.
pub fn validate_repo_dir(repo_dir: &str) -> Result<PathBuf> {
    let trimmed = repo_dir.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed == "/" {
        return Err(EvolveError::InvalidRepoPath(repo_dir.to_string()));
    }
    Ok(PathBuf::from(trimmed))
}

// ---------------------------------------------------------------------------
// Branch name validation
// ---------------------------------------------------------------------------

static BRANCH_RE: OnceLock<Regex> = OnceLock::new();

fn branch_re() -> &'static Regex {
    BRANCH_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._/\-]*$").unwrap())
}

/// Conservative subset of git's ref-format rules.
pub fn is_valid_branch_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 200
        && branch_re().is_match(name)
        && !name.contains("..")
        && !name.contains("//")
        && !name.ends_with('/')
        && !name.ends_with(".lock")
        && !name.ends_with('.')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
