use serde::{Deserialize, Serialize};

use crate::capture::GapSeries;
use crate::models::CaptureRecord;

use super::algorithm::named_spans;
use super::error::PolicyError;
use super::naming::DEFAULT_TEMPLATE;

/// How the threshold value is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdUnit {
    AbsoluteSeconds,
    MultipleOfMedianGap,
}

impl Default for ThresholdUnit {
    fn default() -> Self {
        ThresholdUnit::MultipleOfMedianGap
    }
}

impl ThresholdUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdUnit::AbsoluteSeconds => "seconds",
            ThresholdUnit::MultipleOfMedianGap => "multiple of median sampling interval",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThresholdUnit::AbsoluteSeconds => ThresholdUnit::MultipleOfMedianGap,
            ThresholdUnit::MultipleOfMedianGap => ThresholdUnit::AbsoluteSeconds,
        }
    }
}

/// What happens to the files of each group on commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActionMode {
    Move,
    Copy,
}

impl Default for ActionMode {
    fn default() -> Self {
        ActionMode::Move
    }
}

impl ActionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionMode::Move => "move",
            ActionMode::Copy => "copy",
        }
    }
}

/// Segmentation and commit policy, tuned interactively by the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Split into groups by time gap at all; otherwise one group holds everything.
    pub split_enabled: bool,
    pub threshold_unit: ThresholdUnit,
    pub threshold_value: f64,
    pub name_template: String,
    pub first_group_number: u32,
    /// Sub-split every temporal group by file category.
    pub category_split: bool,

    // Commit-only settings; changing these never invalidates a partition.
    pub action_mode: ActionMode,
    pub export_enabled: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            split_enabled: false,
            threshold_unit: ThresholdUnit::MultipleOfMedianGap,
            threshold_value: 10.0,
            name_template: DEFAULT_TEMPLATE.to_string(),
            first_group_number: 1,
            category_split: false,
            action_mode: ActionMode::Move,
            export_enabled: true,
        }
    }
}

impl Policy {
    /// True when `other` would segment differently from `self`.
    pub fn segmentation_differs(&self, other: &Policy) -> bool {
        self.split_enabled != other.split_enabled
            || self.threshold_unit != other.threshold_unit
            || self.threshold_value != other.threshold_value
            || self.name_template != other.name_template
            || self.first_group_number != other.first_group_number
            || self.category_split != other.category_split
    }

    /// Absolute gap threshold in seconds, or `None` when splitting is off.
    pub fn resolve_threshold(&self, gaps: &GapSeries) -> Result<Option<f64>, PolicyError> {
        if !self.split_enabled {
            return Ok(None);
        }

        let threshold = match self.threshold_unit {
            ThresholdUnit::AbsoluteSeconds => self.threshold_value,
            ThresholdUnit::MultipleOfMedianGap => {
                let median = gaps.median().ok_or(PolicyError::UndefinedMedian)?;
                self.threshold_value * median
            }
        };
        Ok(Some(threshold))
    }

    /// Check that this policy can segment `records`: the threshold resolves
    /// and every flight gets a distinct name that stays under the root.
    pub fn validate(&self, records: &[CaptureRecord], gaps: &GapSeries) -> Result<(), PolicyError> {
        if !self.threshold_value.is_finite() || self.threshold_value <= 0.0 {
            return Err(PolicyError::InvalidThreshold(self.threshold_value.to_string()));
        }
        if self.name_template.trim().is_empty() {
            return Err(PolicyError::EmptyTemplate);
        }
        if let Some(threshold) = self.resolve_threshold(gaps)? {
            named_spans(records, gaps, self, threshold)?;
        }
        Ok(())
    }
}

/// Parse operator input for the threshold value.
pub fn parse_threshold_value(raw: &str) -> Result<f64, PolicyError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(PolicyError::InvalidThreshold(raw.trim().to_string())),
    }
}

/// Parse operator input for the first group number.
pub fn parse_group_number(raw: &str) -> Result<u32, PolicyError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| PolicyError::InvalidGroupNumber(raw.trim().to_string()))
}
