use crate::error::{EvolveError, Result};
use crate::paths;
use crate::template::{Slot, Template};
use crate::types::{Developer, Strategy};
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Info,
    Warning,
}

// ---------------------------------------------------------------------------
// ConfigSource
// ---------------------------------------------------------------------------

/// Where the override layer on top of the built-in defaults came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    Inline,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    #[serde(default = "default_age")]
    pub repo_age_in_days: u32,
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    /// Explicit team as `[name, email]` pairs. Takes precedence over `team_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_data: Option<Vec<Developer>>,
    #[serde(default = "default_strategy")]
    pub developer_strategy: String,
    #[serde(default = "default_general_words")]
    pub general_commit_words: Vec<String>,
    #[serde(default = "default_merge_words")]
    pub merge_commit_words: Vec<String>,
    #[serde(default = "default_max_commits")]
    pub max_commits_per_branch: u32,
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,
    #[serde(default = "default_datetime_format")]
    pub datetime_format_template: String,
    #[serde(default = "default_ticket_template")]
    pub ticket_id_template: String,
    #[serde(default = "default_message_template")]
    pub message_template: String,
    #[serde(default = "default_trunk")]
    pub trunk_branch: String,
    #[serde(default = "default_sentence_words")]
    pub sentence_words: usize,
}

fn default_seed() -> u64 {
    42
}

fn default_age() -> u32 {
    10
}

fn default_team_size() -> usize {
    3
}

fn default_strategy() -> String {
    Strategy::RandomUniform.as_str().to_string()
}

fn default_general_words() -> Vec<String> {
    ["Add", "an", "empty", "change"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_merge_words() -> Vec<String> {
    ["Introduce", "the", "feature"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_commits() -> u32 {
    10
}

fn default_repo_dir() -> String {
    "repository".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%dT%H:%M:%S".to_string()
}

fn default_ticket_template() -> String {
    "ACME-%d".to_string()
}

fn default_message_template() -> String {
    "%s %s".to_string()
}

fn default_trunk() -> String {
    "master".to_string()
}

fn default_sentence_words() -> usize {
    6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            random_seed: default_seed(),
            repo_age_in_days: default_age(),
            team_size: default_team_size(),
            developer_data: None,
            developer_strategy: default_strategy(),
            general_commit_words: default_general_words(),
            merge_commit_words: default_merge_words(),
            max_commits_per_branch: default_max_commits(),
            repo_dir: default_repo_dir(),
            datetime_format_template: default_datetime_format(),
            ticket_id_template: default_ticket_template(),
            message_template: default_message_template(),
            trunk_branch: default_trunk(),
            sentence_words: default_sentence_words(),
        }
    }
}

impl Config {
    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Layer a JSON document over the defaults. Keys not present keep their
    /// default; unknown keys are ignored.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if paths::is_yaml(path) {
            Self::from_yaml_str(&data)
        } else {
            Self::from_json_str(&data)
        }
    }

    /// Resolve the configuration from an optional CLI argument.
    ///
    /// - no argument: `reporch.json` in `cwd` if present, else defaults
    /// - an existing file: parsed as YAML or JSON by extension
    /// - any other non-empty text: parsed as inline JSON
    /// - empty text: defaults
    pub fn resolve(arg: Option<&str>, cwd: &Path) -> Result<(Self, ConfigSource)> {
        match arg {
            None => {
                let path = paths::default_config_path(cwd);
                if path.is_file() {
                    Ok((Self::load_file(&path)?, ConfigSource::File(path)))
                } else {
                    Ok((Self::default(), ConfigSource::Defaults))
                }
            }
            Some(text) => {
                let path = Path::new(text);
                if path.is_file() {
                    Ok((Self::load_file(path)?, ConfigSource::File(path.to_path_buf())))
                } else if text.trim().is_empty() {
                    Ok((Self::default(), ConfigSource::Defaults))
                } else {
                    Ok((Self::from_json_str(text)?, ConfigSource::Inline))
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn strategy(&self) -> Result<Strategy> {
        self.developer_strategy.parse()
    }

    pub fn ticket_template(&self) -> Result<Template> {
        Template::with_slots(&self.ticket_id_template, &[Slot::Int])
    }

    pub fn message_template(&self) -> Result<Template> {
        Template::with_slots(&self.message_template, &[Slot::Str, Slot::Str])
    }

    pub fn words(&self, phase: crate::types::Phase) -> &[String] {
        match phase {
            crate::types::Phase::General => &self.general_commit_words,
            crate::types::Phase::Merge => &self.merge_commit_words,
        }
    }

    // -----------------------------------------------------------------------
    // Fatal checks
    // -----------------------------------------------------------------------

    /// Reject configurations the engine cannot run. Called once at session
    /// assembly; nothing later re-checks.
    pub fn check(&self) -> Result<()> {
        self.strategy()?;
        paths::validate_repo_dir(&self.repo_dir)?;

        if self.max_commits_per_branch == 0 {
            return Err(EvolveError::InvalidConfig(
                "max_commits_per_branch must be at least 1".to_string(),
            ));
        }
        match &self.developer_data {
            Some(devs) if devs.is_empty() => {
                return Err(EvolveError::InvalidConfig(
                    "developer_data must list at least one developer".to_string(),
                ));
            }
            None if self.team_size == 0 => {
                return Err(EvolveError::InvalidConfig(
                    "team_size must be at least 1".to_string(),
                ));
            }
            _ => {}
        }
        if self.sentence_words == 0 {
            return Err(EvolveError::InvalidConfig(
                "sentence_words must be at least 1".to_string(),
            ));
        }

        if StrftimeItems::new(&self.datetime_format_template).any(|i| matches!(i, Item::Error)) {
            return Err(EvolveError::InvalidTemplate {
                template: self.datetime_format_template.clone(),
                reason: "not a valid strftime format".to_string(),
            });
        }

        let ticket = self.ticket_template()?;
        let sample = ticket.render(&["1"]);
        if !paths::is_valid_branch_name(&sample) {
            return Err(EvolveError::InvalidTemplate {
                template: self.ticket_id_template.clone(),
                reason: format!("renders to '{sample}', which is not a valid branch name"),
            });
        }
        self.message_template()?;

        if !paths::is_valid_branch_name(&self.trunk_branch) {
            return Err(EvolveError::InvalidConfig(format!(
                "trunk_branch '{}' is not a valid branch name",
                self.trunk_branch
            )));
        }
        let highest = u64::from(self.repo_age_in_days.max(1));
        if let Some(n) = ticket.int_for(&self.trunk_branch) {
            if (1..=highest).contains(&n) {
                return Err(EvolveError::InvalidConfig(format!(
                    "ticket ids would collide with trunk branch '{}'",
                    self.trunk_branch
                )));
            }
        }

        let window = Duration::days(i64::from(self.repo_age_in_days));
        if Utc::now().checked_sub_signed(window).is_none() {
            return Err(EvolveError::InvalidConfig(format!(
                "repo_age_in_days={} starts before the earliest representable date",
                self.repo_age_in_days
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(devs) = &self.developer_data {
            let mut seen = HashSet::new();
            for dev in devs {
                if !seen.insert(dev) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("developer {dev} is listed more than once"),
                    });
                }
            }
            if self.team_size != devs.len() && self.team_size != default_team_size() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Info,
                    message: format!(
                        "team_size={} is ignored because developer_data lists {} developers",
                        self.team_size,
                        devs.len()
                    ),
                });
            }
        }

        for (key, words) in [
            ("general_commit_words", &self.general_commit_words),
            ("merge_commit_words", &self.merge_commit_words),
        ] {
            if words.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} is empty; messages will start with a blank"),
                });
            }
        }

        if self.repo_age_in_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Info,
                message: "repo_age_in_days=0 produces an empty repository".to_string(),
            });
        } else if self.repo_age_in_days > 3650 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "repo_age_in_days={} means {} commits (>10 years is unusual)",
                    self.repo_age_in_days,
                    u64::from(self.repo_age_in_days) * 24
                ),
            });
        }

        if u64::from(self.max_commits_per_branch) > u64::from(self.repo_age_in_days) * 24
            && self.repo_age_in_days > 0
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Info,
                message: format!(
                    "max_commits_per_branch={} exceeds the number of hourly ticks",
                    self.max_commits_per_branch
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.random_seed, 42);
        assert_eq!(cfg.repo_age_in_days, 10);
        assert_eq!(cfg.team_size, 3);
        assert_eq!(cfg.developer_strategy, "random-uniform");
        assert_eq!(cfg.max_commits_per_branch, 10);
        assert_eq!(cfg.ticket_id_template, "ACME-%d");
        assert_eq!(cfg.message_template, "%s %s");
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn inline_json_layers_over_defaults() {
        let cfg = Config::from_json_str(r#"{"random_seed": 22, "foo": "bar"}"#).unwrap();
        assert_eq!(cfg.random_seed, 22);
        assert_eq!(cfg.repo_age_in_days, 10);
    }

    #[test]
    fn developer_data_pairs() {
        let cfg = Config::from_json_str(r#"{"developer_data": [["a", "b"]]}"#).unwrap();
        assert_eq!(cfg.developer_data, Some(vec![Developer::new("a", "b")]));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = Config::from_json_str("-1 invalid_json").unwrap_err();
        assert!(matches!(err, EvolveError::Json(_)));
    }

    #[test]
    fn resolve_missing_file_falls_back_to_inline_json() {
        let dir = TempDir::new().unwrap();
        let err = Config::resolve(Some("non-existing-file.really"), dir.path()).unwrap_err();
        assert!(matches!(err, EvolveError::Json(_)));
    }

    #[test]
    fn resolve_without_argument_uses_default_file() {
        let dir = TempDir::new().unwrap();
        let (cfg, source) = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(cfg, Config::default());

        std::fs::write(dir.path().join("reporch.json"), r#"{"random_seed": 22}"#).unwrap();
        let (cfg, source) = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(cfg.random_seed, 22);
        assert!(matches!(source, ConfigSource::File(_)));
    }

    #[test]
    fn resolve_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "repo_age_in_days: 2\ndeveloper_strategy: round-robin\n").unwrap();
        let (cfg, source) = Config::resolve(path.to_str(), dir.path()).unwrap();
        assert_eq!(cfg.repo_age_in_days, 2);
        assert_eq!(cfg.strategy().unwrap(), Strategy::RoundRobin);
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn resolve_empty_argument_is_defaults() {
        let dir = TempDir::new().unwrap();
        let (cfg, source) = Config::resolve(Some(""), dir.path()).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn trunk_matching_any_drawable_ticket_fails_check() {
        let cfg = Config {
            trunk_branch: "ACME-3".to_string(),
            repo_age_in_days: 10,
            ..Config::default()
        };
        assert!(matches!(cfg.check(), Err(EvolveError::InvalidConfig(_))));

        // ACME-11 is out of reach with a ten day age.
        let cfg = Config {
            trunk_branch: "ACME-11".to_string(),
            ..cfg
        };
        assert!(cfg.check().is_ok());

        let cfg = Config {
            trunk_branch: "ACME-03".to_string(),
            ..cfg
        };
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn unrepresentable_age_fails_check() {
        let cfg = Config {
            repo_age_in_days: 4_000_000_000,
            ..Config::default()
        };
        let err = cfg.check().unwrap_err();
        assert!(err.to_string().contains("repo_age_in_days=4000000000"), "{err}");
    }

    #[test]
    fn unknown_strategy_fails_check() {
        let cfg = Config::from_json_str(r#"{"developer_strategy": "unknown-strategy"}"#).unwrap();
        let err = cfg.check().unwrap_err();
        assert!(err.to_string().contains("'unknown-strategy'"));
    }

    #[test]
    fn empty_repo_dir_fails_check() {
        let cfg = Config {
            repo_dir: String::new(),
            ..Config::default()
        };
        assert!(matches!(cfg.check(), Err(EvolveError::InvalidRepoPath(_))));
    }

    #[test]
    fn zero_max_commits_fails_check() {
        let cfg = Config {
            max_commits_per_branch: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.check(), Err(EvolveError::InvalidConfig(_))));
    }

    #[test]
    fn empty_team_fails_check() {
        let cfg = Config {
            team_size: 0,
            ..Config::default()
        };
        assert!(cfg.check().is_err());

        let cfg = Config {
            developer_data: Some(vec![]),
            ..Config::default()
        };
        assert!(cfg.check().is_err());
    }

    #[test]
    fn bad_templates_fail_check() {
        let cfg = Config {
            ticket_id_template: "ACME".to_string(),
            ..Config::default()
        };
        assert!(matches!(cfg.check(), Err(EvolveError::InvalidTemplate { .. })));

        let cfg = Config {
            ticket_id_template: "ACME %d".to_string(),
            ..Config::default()
        };
        assert!(cfg.check().is_err());

        let cfg = Config {
            message_template: "%s".to_string(),
            ..Config::default()
        };
        assert!(cfg.check().is_err());

        let cfg = Config {
            datetime_format_template: "%Y-%".to_string(),
            ..Config::default()
        };
        assert!(cfg.check().is_err());
    }

    #[test]
    fn duplicate_developers_warn() {
        let cfg = Config::from_json_str(r#"{"developer_data": [["a", "b"], ["a", "b"]]}"#).unwrap();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("more than once")));
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn yaml_roundtrip() {
        let cfg = Config {
            developer_data: Some(vec![Developer::new("Ada", "ada@example.com")]),
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }
}
