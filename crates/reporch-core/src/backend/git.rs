//! Backend that drives a real repository through the `git` binary.
//!
//! Only plumbing commands are used, so no porcelain configuration (hooks,
//! editors, signing) can interfere with the synthetic history.

use super::{Backend, CommitRequest};
use crate::error::{EvolveError, Result};
use crate::types::{CommitId, Developer, Stamp};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
    dir: PathBuf,
}

impl GitCli {
    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.arg("-C")
            .arg(&self.dir)
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run a git command and return its trimmed stdout. A non-zero exit is
    /// a backend error carrying git's stderr.
    fn run(&self, op: &str, args: &[&str]) -> Result<String> {
        self.run_with(op, self.command(args), None)
    }

    fn run_with(&self, op: &str, mut cmd: Command, stdin: Option<&str>) -> Result<String> {
        tracing::debug!(op, cmd = ?cmd, "git");
        if stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }
        let mut child = cmd
            .spawn()
            .map_err(|e| EvolveError::backend(op, format!("failed to spawn git: {e}")))?;
        if let Some(input) = stdin {
            if let Some(pipe) = child.stdin.as_mut() {
                pipe.write_all(input.as_bytes())
                    .map_err(|e| EvolveError::backend(op, format!("failed to write stdin: {e}")))?;
            }
            // Close stdin so git sees EOF.
            drop(child.stdin.take());
        }
        let output = child
            .wait_with_output()
            .map_err(|e| EvolveError::backend(op, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvolveError::backend(op, stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// The commit HEAD resolves to, or `None` on an unborn branch.
    ///
    /// `rev-parse -q --verify` exits 1 only when the name does not resolve;
    /// any other failure is an error.
    fn head_commit(&self) -> Result<Option<CommitId>> {
        let mut cmd = self.command(&["rev-parse", "-q", "--verify", "HEAD^{commit}"]);
        tracing::debug!(op = "head_commit", cmd = ?cmd, "git");
        let output = cmd
            .output()
            .map_err(|e| EvolveError::backend("head_commit", format!("failed to spawn git: {e}")))?;
        match output.status.code() {
            Some(0) => {
                let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(CommitId(id)))
            }
            Some(1) => Ok(None),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(EvolveError::backend("head_commit", stderr.trim().to_string()))
            }
        }
    }
}

fn raw_date(stamp: &Stamp) -> String {
    format!("{} +0000", stamp.at.timestamp())
}

fn set_identity(cmd: &mut Command, role: &str, who: &Developer, when: &Stamp) {
    cmd.env(format!("GIT_{role}_NAME"), &who.name)
        .env(format!("GIT_{role}_EMAIL"), &who.email)
        .env(format!("GIT_{role}_DATE"), raw_date(when));
}

fn branch_ref(name: &str) -> String {
    format!("refs/heads/{name}")
}

impl Backend for GitCli {
    fn init(path: &Path, trunk: &str) -> Result<Self> {
        let git = which::which("git").map_err(|_| EvolveError::GitNotFound)?;
        crate::io::replace_dir(path)?;
        let cli = Self {
            git,
            dir: path.to_path_buf(),
        };
        cli.run("init", &["init", "-q"])?;
        cli.run("init", &["symbolic-ref", "HEAD", branch_ref(trunk).as_str()])?;
        tracing::info!(path = %path.display(), trunk, "initialized repository");
        Ok(cli)
    }

    fn create_branch(&mut self, name: &str) -> Result<()> {
        self.run("create_branch", &["branch", name])?;
        Ok(())
    }

    fn switch_head(&mut self, name: &str) -> Result<()> {
        self.run("switch_head", &["symbolic-ref", "HEAD", branch_ref(name).as_str()])?;
        Ok(())
    }

    fn reset_working_tree(&mut self) -> Result<()> {
        self.run("reset_working_tree", &["reset", "-q", "--hard"])?;
        Ok(())
    }

    fn commit(&mut self, request: &CommitRequest) -> Result<CommitId> {
        // Unmerged index entries make write-tree fail, which is the only way
        // a merge conflict could surface.
        let tree = self.run("commit", &["write-tree"])?;
        let parents = match &request.parents {
            Some(parents) => parents.clone(),
            None => self.head_commit()?.into_iter().collect(),
        };

        let mut args: Vec<String> = vec!["commit-tree".to_string(), tree];
        for parent in &parents {
            args.push("-p".to_string());
            args.push(parent.to_string());
        }
        args.push("-F".to_string());
        args.push("-".to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let mut cmd = self.command(&arg_refs);
        let facts = &request.facts;
        set_identity(&mut cmd, "AUTHOR", &facts.author, &facts.author_date);
        set_identity(&mut cmd, "COMMITTER", &facts.committer, &facts.commit_date);
        let id = CommitId(self.run_with("commit", cmd, Some(&request.message))?);

        if request.set_as_head {
            self.run("commit", &["update-ref", "HEAD", id.as_str()])?;
        }
        Ok(id)
    }

    fn merge_base(&mut self, a: &str, b: &str) -> Result<CommitId> {
        let base = self.run(
            "merge_base",
            &["merge-base", branch_ref(a).as_str(), branch_ref(b).as_str()],
        )?;
        Ok(CommitId(base))
    }

    fn merge_into_index(&mut self, target: &str, base: &CommitId) -> Result<()> {
        self.run(
            "merge_into_index",
            &["read-tree", "-m", "-i", base.as_str(), branch_ref(target).as_str(), "HEAD"],
        )?;
        Ok(())
    }

    fn delete_branch(&mut self, name: &str) -> Result<()> {
        self.run("delete_branch", &["branch", "-q", "-D", name])?;
        Ok(())
    }

    fn advance_branch(&mut self, name: &str, id: &CommitId) -> Result<()> {
        self.run(
            "advance_branch",
            &["update-ref", branch_ref(name).as_str(), id.as_str()],
        )?;
        Ok(())
    }

    fn branch_tip(&mut self, name: &str) -> Result<CommitId> {
        let spec = format!("{}^{{commit}}", branch_ref(name));
        let id = self.run("branch_tip", &["rev-parse", "--verify", spec.as_str()])?;
        Ok(CommitId(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
