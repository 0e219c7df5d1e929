use serde::{Deserialize, Serialize};

use crate::capture::GapSeries;
use crate::models::CaptureRecord;
use crate::segmentation::{segment_captures, ActionMode, CategoryRule, Partition, Policy, PolicyError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Editing,
    Committed,
    Aborted,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Editing
    }
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Editing)
    }
}

/// Current policy plus the partition derived from it.
///
/// `stale` starts out true and is set again by any edit that changes how
/// captures are segmented. Edits to commit-only fields leave it alone.
#[derive(Debug, Clone)]
pub struct ConfigState {
    policy: Policy,
    stale: bool,
    partition: Partition,
}

impl ConfigState {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            stale: true,
            partition: Partition::default(),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Last computed partition. Only meaningful when `!is_stale()`.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Apply `edit` to a copy of the policy and keep it only if it validates
    /// against the capture sequence. Returns whether the partition went stale.
    pub fn update<F>(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
        edit: F,
    ) -> Result<bool, PolicyError>
    where
        F: FnOnce(&mut Policy),
    {
        let mut candidate = self.policy.clone();
        edit(&mut candidate);
        candidate.validate(records, gaps)?;

        let invalidates = candidate.segmentation_differs(&self.policy);
        if invalidates {
            self.stale = true;
        }
        self.policy = candidate;
        Ok(invalidates)
    }

    pub fn toggle_split(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.split_enabled = !p.split_enabled)
    }

    pub fn toggle_threshold_unit(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.threshold_unit = p.threshold_unit.toggled())
    }

    pub fn set_threshold_value(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
        value: f64,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.threshold_value = value)
    }

    pub fn set_name_template(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
        template: String,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.name_template = template)
    }

    pub fn set_first_group_number(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
        number: u32,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.first_group_number = number)
    }

    pub fn toggle_category_split(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
    ) -> Result<bool, PolicyError> {
        self.update(records, gaps, |p| p.category_split = !p.category_split)
    }

    pub fn set_action_mode(&mut self, mode: ActionMode) {
        self.policy.action_mode = mode;
    }

    pub fn toggle_export(&mut self) {
        self.policy.export_enabled = !self.policy.export_enabled;
    }

    /// Re-run segmentation only when the policy changed since the last run.
    /// Returns whether a recomputation happened.
    pub fn recompute_if_stale(
        &mut self,
        records: &[CaptureRecord],
        gaps: &GapSeries,
        rule: &dyn CategoryRule,
    ) -> Result<bool, PolicyError> {
        if !self.stale {
            return Ok(false);
        }
        self.partition = segment_captures(records, gaps, &self.policy, rule)?;
        self.stale = false;
        Ok(true)
    }
}
