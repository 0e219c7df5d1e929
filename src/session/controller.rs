use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    capture::{CaptureError, CaptureStore, GapSeries, GapStats},
    models::CaptureRecord,
    segmentation::{
        config::{parse_group_number, parse_threshold_value},
        CategoryRule, Partition, Policy, PolicyError,
    },
};

use super::{Command, ConfigState, SessionStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Per-group line of the session summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub count: usize,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// Everything the presentation side needs to draw one menu.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub capture_count: usize,
    pub skipped_count: usize,
    pub gap_stats: GapStats,
    pub policy: Policy,
    pub threshold_secs: Option<f64>,
    pub groups: Vec<GroupSummary>,
}

/// Presentation collaborator for the editing loop.
pub trait Console {
    fn render(&mut self, view: &SessionView) -> Result<()>;

    /// Block until the operator picks one command.
    fn read_command(&mut self, view: &SessionView) -> Result<Command>;

    /// Tell the operator an edit was refused.
    fn reject(&mut self, error: &PolicyError) -> Result<()>;
}

/// Drives the edit/recompute/render loop over one capture sequence.
pub struct SessionController {
    store: CaptureStore,
    gaps: GapSeries,
    state: ConfigState,
    status: SessionStatus,
    rule: Box<dyn CategoryRule>,
}

impl SessionController {
    /// Fails with `EmptyInput` when the store holds no captures. An initial
    /// policy that can't segment these captures is replaced by the defaults
    /// (keeping its commit settings).
    pub fn new(
        store: CaptureStore,
        policy: Policy,
        rule: Box<dyn CategoryRule>,
    ) -> Result<Self, CaptureError> {
        let gaps = store.gaps()?;

        let policy = match policy.validate(store.records(), &gaps) {
            Ok(()) => policy,
            Err(err) => {
                log_warn!("Initial settings rejected ({err}); starting with splitting disabled");
                Policy {
                    action_mode: policy.action_mode,
                    export_enabled: policy.export_enabled,
                    ..Policy::default()
                }
            }
        };

        Ok(Self {
            store,
            gaps,
            state: ConfigState::new(policy),
            status: SessionStatus::Editing,
            rule,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn policy(&self) -> &Policy {
        self.state.policy()
    }

    pub fn records(&self) -> &[CaptureRecord] {
        self.store.records()
    }

    pub fn gaps(&self) -> &GapSeries {
        &self.gaps
    }

    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    /// Bring the partition up to date and return it.
    pub fn partition(&mut self) -> Result<&Partition> {
        self.refresh()?;
        Ok(self.state.partition())
    }

    fn refresh(&mut self) -> Result<()> {
        // every edit is validated before it lands, so this only fails on a bug
        let recomputed = self
            .state
            .recompute_if_stale(self.store.records(), &self.gaps, self.rule.as_ref())
            .map_err(|err| anyhow!("segmentation failed for an accepted policy: {err}"))?;
        if recomputed {
            log_debug!("Recomputed partition: {} group(s)", self.state.partition().len());
        }
        Ok(())
    }

    pub fn view(&mut self) -> Result<SessionView> {
        self.refresh()?;
        let records = self.store.records();
        let partition = self.state.partition();

        Ok(SessionView {
            capture_count: records.len(),
            skipped_count: self.store.skipped().len(),
            gap_stats: self.gaps.stats(),
            policy: self.state.policy().clone(),
            threshold_secs: partition.threshold_secs,
            groups: partition
                .groups
                .iter()
                .map(|group| GroupSummary {
                    name: group.name.clone(),
                    count: group.len(),
                    start: group.start_time(records),
                    end: group.end_time(records),
                })
                .collect(),
        })
    }

    /// Apply one command. A refused edit returns the fault and leaves both
    /// policy and status untouched. Commands after a terminal state are ignored.
    pub fn apply(&mut self, command: Command) -> Result<(), PolicyError> {
        if self.status.is_terminal() {
            return Ok(());
        }

        let records = self.store.records();
        let gaps = &self.gaps;
        match command {
            Command::Commit => self.status = SessionStatus::Committed,
            Command::Abort => self.status = SessionStatus::Aborted,
            Command::Unrecognized(input) => {
                log_info!("Unrecognized command {input:?}; ending session without changes");
                self.status = SessionStatus::Aborted;
            }
            Command::ToggleSplit => {
                self.state.toggle_split(records, gaps)?;
            }
            Command::ToggleThresholdUnit => {
                self.state.toggle_threshold_unit(records, gaps)?;
            }
            Command::SetThresholdValue(raw) => {
                let value = parse_threshold_value(&raw)?;
                self.state.set_threshold_value(records, gaps, value)?;
            }
            Command::SetNameTemplate(template) => {
                self.state.set_name_template(records, gaps, template.trim().to_string())?;
            }
            Command::SetFirstGroupNumber(raw) => {
                let number = parse_group_number(&raw)?;
                self.state.set_first_group_number(records, gaps, number)?;
            }
            Command::ToggleCategorySplit => {
                self.state.toggle_category_split(records, gaps)?;
            }
            Command::SetActionMode(mode) => self.state.set_action_mode(mode),
            Command::ToggleExport => self.state.toggle_export(),
        }
        Ok(())
    }

    /// Run the editing loop until the operator commits or aborts.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<SessionStatus> {
        while !self.status.is_terminal() {
            let view = self.view()?;
            console.render(&view)?;

            let command = console.read_command(&view)?;
            log_debug!("Operator command: {command:?}");
            if let Err(err) = self.apply(command) {
                log_warn!("Edit rejected: {err}");
                console.reject(&err)?;
            }
        }

        // the partition must reflect the final policy before anyone commits it
        self.refresh()?;
        Ok(self.status)
    }
}
