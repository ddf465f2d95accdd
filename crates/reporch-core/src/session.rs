use crate::config::Config;
use crate::error::Result;
use crate::feature::Model;
use crate::message::MessageComposer;
use crate::template::Template;
use crate::text::LoremText;
use crate::types::{Developer, Strategy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker for the engine's random source in snapshots.
pub const RNG_ALGORITHM: &str = "chacha8";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A validated configuration plus the live, seeded state one run needs.
///
/// Assembly is the only place configuration errors surface; once a session
/// exists, a run can fail only in the backend.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: Config,
    pub(crate) strategy: Strategy,
    pub(crate) ticket_template: Template,
    pub(crate) composer: MessageComposer,
    pub(crate) team: Vec<Developer>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) text: LoremText,
}

impl Session {
    pub fn assemble(config: Config) -> Result<Self> {
        config.check()?;
        let strategy = config.strategy()?;
        let ticket_template = config.ticket_template()?;
        let composer = MessageComposer::new(&config)?;

        let mut text = LoremText::seeded(config.random_seed);
        let team = match &config.developer_data {
            Some(devs) => devs.clone(),
            None => (0..config.team_size).map(|_| text.developer()).collect(),
        };
        let rng = ChaCha8Rng::seed_from_u64(config.random_seed);

        tracing::debug!(
            seed = config.random_seed,
            strategy = %strategy,
            team = team.len(),
            "session assembled"
        );

        Ok(Self {
            config,
            strategy,
            ticket_template,
            composer,
            team,
            rng,
            text,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn team(&self) -> &[Developer] {
        &self.team
    }

    pub fn repo_dir(&self) -> PathBuf {
        PathBuf::from(self.config.repo_dir.trim())
    }

    /// Freeze the run into a snapshot. Consumes the session: the generator
    /// and rng state it discards cannot be rebuilt mid-run.
    pub fn finalize(self, model: &Model) -> Snapshot {
        let random_state = format!("{RNG_ALGORITHM}:{}", self.config.random_seed);
        Snapshot {
            config: self.config,
            content_generator: LoremText::LABEL.to_string(),
            random_state,
            model: model.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: Config,
    pub content_generator: String,
    pub random_state: String,
    pub model: String,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolveError;
    use tempfile::TempDir;

    #[test]
    fn assemble_generates_team_from_seed() {
        let a = Session::assemble(Config::default()).unwrap();
        let b = Session::assemble(Config::default()).unwrap();
        assert_eq!(a.team().len(), 3);
        assert_eq!(a.team(), b.team());
    }

    #[test]
    fn explicit_developers_win_over_team_size() {
        let cfg = Config::from_json_str(
            r#"{"team_size": 5, "developer_data": [["a", "a@x.io"], ["b", "b@x.io"]]}"#,
        )
        .unwrap();
        let session = Session::assemble(cfg).unwrap();
        assert_eq!(
            session.team(),
            &[Developer::new("a", "a@x.io"), Developer::new("b", "b@x.io")]
        );
    }

    #[test]
    fn unknown_strategy_is_fatal_at_assembly() {
        let cfg = Config::from_json_str(r#"{"developer_strategy": "unknown-strategy"}"#).unwrap();
        let err = Session::assemble(cfg).unwrap_err();
        assert!(matches!(err, EvolveError::UnknownStrategy(ref s) if s == "unknown-strategy"));
    }

    #[test]
    fn finalize_reduces_live_state_to_markers() {
        let session = Session::assemble(Config::default()).unwrap();
        let snapshot = session.finalize(&Model::new());
        assert_eq!(snapshot.content_generator, "LoremText");
        assert_eq!(snapshot.random_state, "chacha8:42");
        assert_eq!(
            snapshot.model,
            "Model<developer=None, ticket=None, commits=0, planned=0>"
        );
        assert!(snapshot.config.developer_data.is_none());
    }

    #[test]
    fn snapshot_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.yaml");
        let snapshot = Session::assemble(Config::default())
            .unwrap()
            .finalize(&Model::new());
        snapshot.save(&path).unwrap();
        assert_eq!(Snapshot::load(&path).unwrap(), snapshot);
    }
}
