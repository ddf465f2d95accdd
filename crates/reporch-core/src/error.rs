use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvolveError {
    #[error(
        "developer selection strategy expected in (random-uniform, round-robin) but found ('{0}') instead"
    )]
    UnknownStrategy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid repository path '{0}': must be a non-empty directory path")]
    InvalidRepoPath(String),

    #[error("invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("git executable not found on PATH")]
    GitNotFound,

    #[error("backend operation '{op}' failed: {detail}")]
    Backend { op: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EvolveError {
    pub fn backend(op: impl Into<String>, detail: impl Into<String>) -> Self {
        EvolveError::Backend {
            op: op.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvolveError>;
