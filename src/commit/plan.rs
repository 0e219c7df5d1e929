use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::CaptureRecord;
use crate::segmentation::{ActionMode, Group, Partition, Policy};

/// Suffix of every point export file.
pub const EXPORT_SUFFIX: &str = "pts.geojson";

/// Move or copy one capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub file: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Attributes written for one capture in a point export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointRecord {
    #[serde(rename = "fn")]
    pub filename: String,
    /// `YYYY:MM:DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&CaptureRecord> for PointRecord {
    fn from(record: &CaptureRecord) -> Self {
        Self {
            filename: record.id.clone(),
            date: record.timestamp.format("%Y:%m:%d").to_string(),
            time: record.timestamp.format("%H:%M:%S").to_string(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub destination: PathBuf,
    pub records: Vec<PointRecord>,
}

/// Everything to do for one group, in member order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub name: String,
    /// Target directory; `None` when files stay where they are.
    pub directory: Option<PathBuf>,
    pub relocations: Vec<Relocation>,
    pub export: Option<ExportJob>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan {
    pub mode: ActionMode,
    pub groups: Vec<GroupPlan>,
}

impl CommitPlan {
    pub fn relocation_count(&self) -> usize {
        self.groups.iter().map(|g| g.relocations.len()).sum()
    }

    pub fn export_count(&self) -> usize {
        self.groups.iter().filter(|g| g.export.is_some()).count()
    }
}

/// Translate the final partition into filesystem and export instructions
/// rooted at `root`. Performs no I/O.
///
/// With splitting enabled every group gets its own directory (nested on `/`)
/// and, when exporting, its own point file inside it. Without splitting files
/// stay in place and a single point file lands in `root`.
pub fn build_plan(
    root: &Path,
    records: &[CaptureRecord],
    partition: &Partition,
    policy: &Policy,
) -> CommitPlan {
    let groups = partition
        .groups
        .iter()
        .map(|group| {
            if policy.split_enabled {
                split_group_plan(root, records, group, policy.export_enabled)
            } else {
                GroupPlan {
                    name: group.name.clone(),
                    directory: None,
                    relocations: Vec::new(),
                    export: policy.export_enabled.then(|| ExportJob {
                        destination: root.join(EXPORT_SUFFIX),
                        records: point_records(records, group),
                    }),
                }
            }
        })
        .collect();

    CommitPlan {
        mode: policy.action_mode,
        groups,
    }
}

fn split_group_plan(root: &Path, records: &[CaptureRecord], group: &Group, export: bool) -> GroupPlan {
    let directory = group_directory(root, &group.name);

    let relocations = group
        .members
        .iter()
        .map(|&i| {
            let file = records[i].id.clone();
            Relocation {
                source: root.join(&file),
                destination: directory.join(&file),
                file,
            }
        })
        .collect();

    let export = export.then(|| ExportJob {
        destination: directory.join(format!("{}_{EXPORT_SUFFIX}", flatten_name(&group.name))),
        records: point_records(records, group),
    });

    GroupPlan {
        name: group.name.clone(),
        directory: Some(directory),
        relocations,
        export,
    }
}

fn point_records(records: &[CaptureRecord], group: &Group) -> Vec<PointRecord> {
    group.members.iter().map(|&i| PointRecord::from(&records[i])).collect()
}

/// Resolve a group name against `root`, treating `/` as a path separator.
pub fn group_directory(root: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Group name usable as a single file-name component.
pub fn flatten_name(name: &str) -> String {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
