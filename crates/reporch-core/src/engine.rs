//! The evolution loop: one ordinary commit per timeline tick, with feature
//! branches opened and merged back into trunk as the model dictates.

use crate::backend::{Backend, CommitRequest};
use crate::error::Result;
use crate::feature::Model;
use crate::session::Session;
use crate::team::DeveloperSelector;
use crate::timeline::Timeline;
use crate::types::{CommitId, Phase, Stamp};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub stamp: Stamp,
    pub commit: CommitId,
    /// The merge commit, when the tick closed a feature.
    pub merged: Option<CommitId>,
    /// The ticket of the feature opened at the end of the tick.
    pub opened: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub model: Model,
    pub ticks: usize,
    /// Every commit object created, merges included.
    pub commits: usize,
    pub merges: usize,
    pub features_opened: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine<'s, B: Backend> {
    session: &'s mut Session,
    backend: &'s mut B,
    selector: DeveloperSelector,
    timeline: Timeline,
    model: Model,
    report: RunReport,
}

impl<'s, B: Backend> Engine<'s, B> {
    /// `backend` must already be initialized with the session's trunk.
    /// The timeline ends at `end` and spans the configured age.
    pub fn new(
        session: &'s mut Session,
        backend: &'s mut B,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        let selector = DeveloperSelector::new(session.team.clone(), session.strategy);
        let timeline = Timeline::new(
            end,
            session.config.repo_age_in_days,
            session.config.datetime_format_template.clone(),
        )?;
        Ok(Self {
            session,
            backend,
            selector,
            timeline,
            model: Model::new(),
            report: RunReport::default(),
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn remaining(&self) -> usize {
        self.timeline.remaining()
    }

    /// Advance one tick. `None` once the timeline is exhausted.
    pub fn step(&mut self) -> Result<Option<TickOutcome>> {
        let Some(stamp) = self.timeline.next_stamp(&mut self.session.rng) else {
            return Ok(None);
        };

        let facts = self
            .model
            .note_change(&mut self.selector, &mut self.session.rng, &stamp);
        let message = self.session.composer.compose(
            &mut self.session.rng,
            &mut self.session.text,
            Phase::General,
            self.model.ticket(),
        );
        let commit = self.backend.commit(&CommitRequest::on_head(message, facts))?;
        self.report.ticks += 1;
        self.report.commits += 1;

        let merged = if self.model.is_due() {
            Some(self.merge_feature(&stamp)?)
        } else {
            None
        };
        let opened = if self.model.is_open() {
            None
        } else {
            Some(self.start_feature()?)
        };

        tracing::debug!(
            at = %stamp.text,
            commit = %commit,
            merged = merged.is_some(),
            model = %self.model,
            "tick"
        );
        Ok(Some(TickOutcome {
            stamp,
            commit,
            merged,
            opened,
        }))
    }

    /// Drive the timeline to exhaustion.
    pub fn run(mut self) -> Result<RunReport> {
        tracing::info!(
            ticks = self.timeline.len(),
            strategy = %self.session.strategy,
            team = self.session.team.len(),
            "evolution started"
        );
        while self.step()?.is_some() {}

        self.report.model = self.model;
        tracing::info!(
            commits = self.report.commits,
            merges = self.report.merges,
            features = self.report.features_opened,
            "evolution finished"
        );
        Ok(self.report)
    }

    /// Merge the due feature into trunk with a two-parent commit, then
    /// return HEAD to trunk and drop the feature ref.
    fn merge_feature(&mut self, stamp: &Stamp) -> Result<CommitId> {
        let trunk = self.session.config.trunk_branch.clone();
        let ticket = self.model.ticket().unwrap_or_default().to_string();

        let base = self.backend.merge_base(&trunk, &ticket)?;
        self.backend.merge_into_index(&trunk, &base)?;
        let trunk_tip = self.backend.branch_tip(&trunk)?;
        let feature_tip = self.backend.branch_tip(&ticket)?;

        let facts = self
            .model
            .note_merge(&mut self.selector, &mut self.session.rng, stamp);
        let message = self.session.composer.compose(
            &mut self.session.rng,
            &mut self.session.text,
            Phase::Merge,
            Some(&ticket),
        );
        let id = self.backend.commit(&CommitRequest {
            message,
            facts,
            parents: Some(vec![trunk_tip, feature_tip]),
            set_as_head: true,
        })?;
        self.backend.advance_branch(&trunk, &id)?;
        self.backend.switch_head(&trunk)?;
        self.backend.delete_branch(&ticket)?;
        self.model.groom();

        self.report.commits += 1;
        self.report.merges += 1;
        tracing::debug!(ticket = %ticket, merge = %id, "feature merged");
        Ok(id)
    }

    /// Plan a feature and put HEAD on a fresh branch at the trunk tip.
    fn start_feature(&mut self) -> Result<String> {
        self.model.plan_feature(
            &self.session.config,
            &self.session.ticket_template,
            &mut self.session.rng,
            &mut self.selector,
        );
        let ticket = self.model.ticket().unwrap_or_default().to_string();
        self.backend.create_branch(&ticket)?;
        self.backend.switch_head(&ticket)?;
        self.backend.reset_working_tree()?;

        self.report.features_opened += 1;
        tracing::debug!(ticket = %ticket, planned = self.model.planned(), "feature opened");
        Ok(ticket)
    }
}

/// Initialize a backend at the session's repository directory and run the
/// whole timeline ending at `end` against it.
pub fn run<B: Backend>(session: &mut Session, end: DateTime<Utc>) -> Result<(B, RunReport)> {
    let mut backend = B::init(&session.repo_dir(), &session.config.trunk_branch)?;
    let report = Engine::new(session, &mut backend, end)?.run()?;
    Ok((backend, report))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
