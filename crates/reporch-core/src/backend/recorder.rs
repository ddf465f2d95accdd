use super::{Backend, CommitRequest};
use crate::error::{EvolveError, Result};
use crate::types::{CommitFacts, CommitId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// BackendCall
// ---------------------------------------------------------------------------

/// One state-changing backend operation, as issued by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BackendCall {
    Init {
        path: PathBuf,
        trunk: String,
    },
    CreateBranch {
        name: String,
    },
    SwitchHead {
        name: String,
    },
    ResetWorkingTree,
    Commit {
        id: CommitId,
        branch: String,
        message: String,
        facts: CommitFacts,
        parents: Vec<CommitId>,
    },
    MergeBase {
        a: String,
        b: String,
        base: CommitId,
    },
    MergeIntoIndex {
        target: String,
        base: CommitId,
    },
    DeleteBranch {
        name: String,
    },
    AdvanceBranch {
        name: String,
        id: CommitId,
    },
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedCommit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    pub message: String,
    pub facts: CommitFacts,
}

/// In-memory backend. Commits get sequential ids, so commit order is also a
/// topological order of the graph.
#[derive(Debug, Clone)]
pub struct Recorder {
    commits: Vec<RecordedCommit>,
    index: BTreeMap<CommitId, usize>,
    branches: BTreeMap<String, CommitId>,
    head: String,
    calls: Vec<BackendCall>,
}

impl Recorder {
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn commits(&self) -> &[RecordedCommit] {
        &self.commits
    }

    pub fn branches(&self) -> &BTreeMap<String, CommitId> {
        &self.branches
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn get(&self, id: &CommitId) -> Option<&RecordedCommit> {
        self.index.get(id).map(|&i| &self.commits[i])
    }

    pub fn merge_commits(&self) -> impl Iterator<Item = &RecordedCommit> {
        self.commits.iter().filter(|c| c.parents.len() > 1)
    }

    /// Follow first parents back from the tip of `branch`.
    pub fn first_parent_log(&self, branch: &str) -> Vec<&RecordedCommit> {
        let mut out = Vec::new();
        let mut cursor = self.branches.get(branch).and_then(|id| self.get(id));
        while let Some(commit) = cursor {
            out.push(commit);
            cursor = commit.parents.first().and_then(|p| self.get(p));
        }
        out
    }

    fn tip(&self, op: &str, name: &str) -> Result<CommitId> {
        self.branches
            .get(name)
            .cloned()
            .ok_or_else(|| EvolveError::backend(op, format!("unknown branch '{name}'")))
    }

    fn ancestors(&self, start: &CommitId) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.clone()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.get(&id) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }
}

impl Backend for Recorder {
    fn init(path: &Path, trunk: &str) -> Result<Self> {
        Ok(Self {
            commits: Vec::new(),
            index: BTreeMap::new(),
            branches: BTreeMap::new(),
            head: trunk.to_string(),
            calls: vec![BackendCall::Init {
                path: path.to_path_buf(),
                trunk: trunk.to_string(),
            }],
        })
    }

    fn create_branch(&mut self, name: &str) -> Result<()> {
        if self.branches.contains_key(name) {
            return Err(EvolveError::backend(
                "create_branch",
                format!("branch '{name}' already exists"),
            ));
        }
        let head = self.head.clone();
        let tip = self.tip("create_branch", &head)?;
        self.branches.insert(name.to_string(), tip);
        self.calls.push(BackendCall::CreateBranch {
            name: name.to_string(),
        });
        Ok(())
    }

    fn switch_head(&mut self, name: &str) -> Result<()> {
        self.head = name.to_string();
        self.calls.push(BackendCall::SwitchHead {
            name: name.to_string(),
        });
        Ok(())
    }

    fn reset_working_tree(&mut self) -> Result<()> {
        self.calls.push(BackendCall::ResetWorkingTree);
        Ok(())
    }

    fn commit(&mut self, request: &CommitRequest) -> Result<CommitId> {
        let parents = match &request.parents {
            Some(parents) => {
                if let Some(missing) = parents.iter().find(|p| !self.index.contains_key(*p)) {
                    return Err(EvolveError::backend(
                        "commit",
                        format!("unknown parent {missing}"),
                    ));
                }
                parents.clone()
            }
            None => self.branches.get(&self.head).cloned().into_iter().collect(),
        };

        let id = CommitId(format!("{:040x}", self.commits.len() + 1));
        self.index.insert(id.clone(), self.commits.len());
        self.commits.push(RecordedCommit {
            id: id.clone(),
            parents: parents.clone(),
            message: request.message.clone(),
            facts: request.facts.clone(),
        });
        if request.set_as_head {
            self.branches.insert(self.head.clone(), id.clone());
        }
        self.calls.push(BackendCall::Commit {
            id: id.clone(),
            branch: self.head.clone(),
            message: request.message.clone(),
            facts: request.facts.clone(),
            parents,
        });
        Ok(id)
    }

    fn merge_base(&mut self, a: &str, b: &str) -> Result<CommitId> {
        let tip_a = self.tip("merge_base", a)?;
        let tip_b = self.tip("merge_base", b)?;
        let from_a = self.ancestors(&tip_a);
        let base = self
            .ancestors(&tip_b)
            .into_iter()
            .filter(|id| from_a.contains(id))
            .max_by_key(|id| self.index.get(id).copied().unwrap_or(0))
            .ok_or_else(|| {
                EvolveError::backend("merge_base", format!("'{a}' and '{b}' share no history"))
            })?;
        self.calls.push(BackendCall::MergeBase {
            a: a.to_string(),
            b: b.to_string(),
            base: base.clone(),
        });
        Ok(base)
    }

    fn merge_into_index(&mut self, target: &str, base: &CommitId) -> Result<()> {
        self.tip("merge_into_index", target)?;
        if !self.index.contains_key(base) {
            return Err(EvolveError::backend(
                "merge_into_index",
                format!("unknown base {base}"),
            ));
        }
        self.calls.push(BackendCall::MergeIntoIndex {
            target: target.to_string(),
            base: base.clone(),
        });
        Ok(())
    }

    fn delete_branch(&mut self, name: &str) -> Result<()> {
        if name == self.head {
            return Err(EvolveError::backend(
                "delete_branch",
                format!("cannot delete checked-out branch '{name}'"),
            ));
        }
        if self.branches.remove(name).is_none() {
            return Err(EvolveError::backend(
                "delete_branch",
                format!("unknown branch '{name}'"),
            ));
        }
        self.calls.push(BackendCall::DeleteBranch {
            name: name.to_string(),
        });
        Ok(())
    }

    fn advance_branch(&mut self, name: &str, id: &CommitId) -> Result<()> {
        if !self.index.contains_key(id) {
            return Err(EvolveError::backend(
                "advance_branch",
                format!("unknown commit {id}"),
            ));
        }
        self.branches.insert(name.to_string(), id.clone());
        self.calls.push(BackendCall::AdvanceBranch {
            name: name.to_string(),
            id: id.clone(),
        });
        Ok(())
    }

    fn branch_tip(&mut self, name: &str) -> Result<CommitId> {
        self.tip("branch_tip", name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
