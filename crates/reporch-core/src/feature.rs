use crate::config::Config;
use crate::team::DeveloperSelector;
use crate::template::Template;
use crate::types::{CommitFacts, Developer, Stamp};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// FeatureState
// ---------------------------------------------------------------------------

/// Whether a feature branch is in flight. The counters only exist while a
/// ticket does, so "no ticket but commits > 0" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeatureState {
    #[default]
    NoActiveFeature,
    FeatureOpen {
        ticket: String,
        commits: u32,
        planned: u32,
    },
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Model {
    /// Last developer who acted.
    pub developer: Option<Developer>,
    pub state: FeatureState,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Option<&str> {
        match &self.state {
            FeatureState::FeatureOpen { ticket, .. } => Some(ticket),
            FeatureState::NoActiveFeature => None,
        }
    }

    pub fn commits(&self) -> u32 {
        match self.state {
            FeatureState::FeatureOpen { commits, .. } => commits,
            FeatureState::NoActiveFeature => 0,
        }
    }

    pub fn planned(&self) -> u32 {
        match self.state {
            FeatureState::FeatureOpen { planned, .. } => planned,
            FeatureState::NoActiveFeature => 0,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FeatureState::FeatureOpen { .. })
    }

    /// Never more commits than planned.
    pub fn is_consistent(&self) -> bool {
        self.commits() <= self.planned()
    }

    /// An open feature that has received every planned commit.
    pub fn is_due(&self) -> bool {
        self.is_open() && self.commits() == self.planned()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Open a new feature: random ticket number in `[1, repo_age_in_days]`,
    /// planned commits in `[1, max_commits_per_branch]`, next developer.
    ///
    /// Ticket collisions with earlier features are allowed.
    pub fn plan_feature<R: Rng + ?Sized>(
        &mut self,
        cfg: &Config,
        ticket_template: &Template,
        rng: &mut R,
        developers: &mut DeveloperSelector,
    ) {
        debug_assert!(!self.is_open(), "plan_feature called with a feature open");
        let number = rng.gen_range(1..=cfg.repo_age_in_days.max(1));
        let ticket = ticket_template.render(&[&number.to_string()]);
        let planned = rng.gen_range(1..=cfg.max_commits_per_branch.max(1));
        self.developer = Some(developers.next_developer(rng));
        self.state = FeatureState::FeatureOpen {
            ticket,
            commits: 0,
            planned,
        };
    }

    /// Record an ordinary commit: the next developer acts, and an open
    /// feature counts one more commit. Commits made with no feature open
    /// land on trunk and are not counted.
    pub fn note_change<R: Rng + ?Sized>(
        &mut self,
        developers: &mut DeveloperSelector,
        rng: &mut R,
        stamp: &Stamp,
    ) -> CommitFacts {
        let developer = developers.next_developer(rng);
        let facts = CommitFacts::by(&developer, stamp);
        self.developer = Some(developer);
        if let FeatureState::FeatureOpen { commits, .. } = &mut self.state {
            *commits += 1;
        }
        facts
    }

    /// The developer integrating the feature into trunk. Consumes one pull
    /// from the selector, separate from the feature's last commit.
    pub fn note_merge<R: Rng + ?Sized>(
        &mut self,
        developers: &mut DeveloperSelector,
        rng: &mut R,
        stamp: &Stamp,
    ) -> CommitFacts {
        let developer = developers.next_developer(rng);
        let facts = CommitFacts::by(&developer, stamp);
        self.developer = Some(developer);
        facts
    }

    /// Close the feature. Called exactly once per merge.
    pub fn groom(&mut self) {
        self.state = FeatureState::NoActiveFeature;
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let developer = match &self.developer {
            Some(d) => format!("('{}', '{}')", d.name, d.email),
            None => "None".to_string(),
        };
        write!(
            f,
            "Model<developer={}, ticket={}, commits={}, planned={}>",
            developer,
            self.ticket().unwrap_or("None"),
            self.commits(),
            self.planned()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
