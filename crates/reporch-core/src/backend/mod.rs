//! Version-control capability used by the engine.
//!
//! `GitCli` drives a real repository through the `git` binary; `Recorder`
//! keeps an in-memory commit graph and an ordered call log, for tests and
//! dry runs.
//!
//! Every commit the engine makes has an empty tree, so the index merge in
//! [`Backend::merge_into_index`] can never conflict. Neither implementation
//! attempts conflict resolution: a failed merge is a fatal backend error.

pub mod git;
pub mod recorder;

pub use git::GitCli;
pub use recorder::{BackendCall, Recorder};

use crate::error::Result;
use crate::types::{CommitFacts, CommitId};
use std::path::Path;

/// Everything needed to create one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub message: String,
    pub facts: CommitFacts,
    /// Explicit parents. `None` means "the commit HEAD currently points at",
    /// or no parent for the first commit.
    pub parents: Option<Vec<CommitId>>,
    /// Move the branch HEAD points at to the new commit.
    pub set_as_head: bool,
}

impl CommitRequest {
    pub fn on_head(message: String, facts: CommitFacts) -> Self {
        Self {
            message,
            facts,
            parents: None,
            set_as_head: true,
        }
    }
}

pub trait Backend {
    /// Create an empty repository at `path`, destroying whatever was there,
    /// with HEAD pointing at the unborn `trunk` branch.
    fn init(path: &Path, trunk: &str) -> Result<Self>
    where
        Self: Sized;

    /// Create branch `name` at the current HEAD commit.
    fn create_branch(&mut self, name: &str) -> Result<()>;

    /// Point HEAD at branch `name`.
    fn switch_head(&mut self, name: &str) -> Result<()>;

    fn reset_working_tree(&mut self) -> Result<()>;

    fn commit(&mut self, request: &CommitRequest) -> Result<CommitId>;

    fn merge_base(&mut self, a: &str, b: &str) -> Result<CommitId>;

    /// Three-way merge of `target` and HEAD over `base` into the index.
    fn merge_into_index(&mut self, target: &str, base: &CommitId) -> Result<()>;

    fn delete_branch(&mut self, name: &str) -> Result<()>;

    /// Force branch `name` to point at `id`.
    fn advance_branch(&mut self, name: &str, id: &CommitId) -> Result<()>;

    fn branch_tip(&mut self, name: &str) -> Result<CommitId>;
}
