use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::segmentation::ActionMode;

use super::export::PointExporter;
use super::plan::{CommitPlan, GroupPlan};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Moves or copies a single file, creating the destination's parent
/// directories. Existing destination files are overwritten.
pub trait Relocator {
    fn relocate(&self, source: &Path, destination: &Path, mode: ActionMode) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsRelocator;

impl Relocator for FsRelocator {
    fn relocate(&self, source: &Path, destination: &Path, mode: ActionMode) -> io::Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        match mode {
            ActionMode::Copy => fs::copy(source, destination).map(|_| ()),
            ActionMode::Move => match fs::rename(source, destination) {
                // rename can't cross filesystems; only then fall back to copy + delete
                Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                    fs::copy(source, destination)?;
                    fs::remove_file(source).map_err(|remove_err| {
                        io::Error::new(
                            remove_err.kind(),
                            format!("copied, but could not remove the original: {remove_err}"),
                        )
                    })
                }
                result => result,
            },
        }
    }
}

/// Operator answer when a group directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteAnswer {
    /// Continue with this group.
    Yes,
    /// Continue with this and every later group without asking again.
    All,
    /// Stop the commit before this group.
    Stop,
}

pub trait OverwritePrompt {
    fn confirm_overwrite(&mut self, group: &str, directory: &Path) -> Result<OverwriteAnswer>;
}

/// One relocation or export that failed. Processing carried on after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectFault {
    pub group: String,
    /// File id for relocation faults, export path for export faults.
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for SideEffectFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.group, self.file, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    pub relocated: usize,
    pub exported: Vec<PathBuf>,
    pub faults: Vec<SideEffectFault>,
    /// Group at which the operator stopped the commit, if they did.
    pub stopped_at: Option<String>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty() && self.stopped_at.is_none()
    }
}

/// Carry out `plan` group by group. Individual failures are recorded and the
/// rest of the plan still runs; nothing already done is rolled back.
pub fn execute(
    plan: &CommitPlan,
    relocator: &dyn Relocator,
    exporter: &dyn PointExporter,
    prompt: &mut dyn OverwritePrompt,
) -> Result<CommitReport> {
    let mut report = CommitReport::default();
    let mut overwrite_all = false;

    for group in &plan.groups {
        if let Some(directory) = &group.directory {
            if directory.exists() {
                if !overwrite_all {
                    match prompt.confirm_overwrite(&group.name, directory)? {
                        OverwriteAnswer::Yes => {}
                        OverwriteAnswer::All => overwrite_all = true,
                        OverwriteAnswer::Stop => {
                            log_info!("Commit stopped before {}", group.name);
                            report.stopped_at = Some(group.name.clone());
                            break;
                        }
                    }
                }
            } else if !group.relocations.is_empty() {
                log_info!("Creating subdirectory {}", group.name);
            }
        }

        relocate_group(group, plan.mode, relocator, &mut report);
        export_group(group, exporter, &mut report);
    }

    Ok(report)
}

fn relocate_group(group: &GroupPlan, mode: ActionMode, relocator: &dyn Relocator, report: &mut CommitReport) {
    if group.relocations.is_empty() {
        return;
    }

    let verb = match mode {
        ActionMode::Move => "Moving",
        ActionMode::Copy => "Copying",
    };
    log_info!("{} {} file(s) to {}...", verb, group.relocations.len(), group.name);

    for relocation in &group.relocations {
        match relocator.relocate(&relocation.source, &relocation.destination, mode) {
            Ok(()) => report.relocated += 1,
            Err(err) => {
                log_error!("Failed to {} {} into {}: {err}", mode.as_str(), relocation.file, group.name);
                report.faults.push(SideEffectFault {
                    group: group.name.clone(),
                    file: relocation.file.clone(),
                    message: err.to_string(),
                });
            }
        }
    }
}

fn export_group(group: &GroupPlan, exporter: &dyn PointExporter, report: &mut CommitReport) {
    let Some(job) = &group.export else {
        return;
    };

    match exporter.export_points(&job.destination, &job.records) {
        Ok(()) => {
            log_info!("Created {}", job.destination.display());
            report.exported.push(job.destination.clone());
        }
        Err(err) => {
            log_error!("Failed to export points for {}: {err:#}", group.name);
            report.faults.push(SideEffectFault {
                group: group.name.clone(),
                file: job.destination.display().to_string(),
                message: format!("{err:#}"),
            });
        }
    }
}
