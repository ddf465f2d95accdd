use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    RandomUniform,
    RoundRobin,
}

impl Strategy {
    pub fn all() -> &'static [Strategy] {
        &[Strategy::RandomUniform, Strategy::RoundRobin]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::RandomUniform => "random-uniform",
            Strategy::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = crate::error::EvolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random-uniform" => Ok(Strategy::RandomUniform),
            "round-robin" => Ok(Strategy::RoundRobin),
            _ => Err(crate::error::EvolveError::UnknownStrategy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Which word list leads a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    General,
    Merge,
}

impl Phase {
    /// Configuration key of the word list for this phase.
    pub fn words_key(self) -> &'static str {
        match self {
            Phase::General => "general_commit_words",
            Phase::Merge => "merge_commit_words",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.words_key())
    }
}

// ---------------------------------------------------------------------------
// Developer
// ---------------------------------------------------------------------------

/// A commit identity. Two developers are the same person iff name and email match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Developer {
    pub name: String,
    pub email: String,
}

impl Developer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<(String, String)> for Developer {
    fn from((name, email): (String, String)) -> Self {
        Self { name, email }
    }
}

impl From<Developer> for (String, String) {
    fn from(dev: Developer) -> Self {
        (dev.name, dev.email)
    }
}

impl fmt::Display for Developer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

// ---------------------------------------------------------------------------
// Stamp / CommitFacts / CommitId
// ---------------------------------------------------------------------------

/// One timeline instant together with its rendering through the
/// configured timestamp template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Author and committer metadata handed to the backend for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFacts {
    pub author: Developer,
    pub committer: Developer,
    pub author_date: Stamp,
    pub commit_date: Stamp,
}

impl CommitFacts {
    pub fn by(developer: &Developer, stamp: &Stamp) -> Self {
        Self {
            author: developer.clone(),
            committer: developer.clone(),
            author_date: stamp.clone(),
            commit_date: stamp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
