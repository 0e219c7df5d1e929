use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::capture::GapSeries;
use crate::models::CaptureRecord;
use crate::segmentation::category::{split_by_category, CategoryRule};
use crate::segmentation::config::Policy;
use crate::segmentation::error::PolicyError;
use crate::segmentation::naming::{render_name, NameContext};

/// Name of the single group produced when splitting is off.
pub const UNSPLIT_GROUP_NAME: &str = "all";

/// A set of captures treated as one flight (or one category of a flight).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Indices into the capture sequence, ascending.
    pub members: Vec<usize>,
    pub name: String,
    /// Category label when the group is a category bucket of a flight.
    pub category: Option<String>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn start_time(&self, records: &[CaptureRecord]) -> Option<NaiveDateTime> {
        self.members.first().map(|&i| records[i].timestamp)
    }

    pub fn end_time(&self, records: &[CaptureRecord]) -> Option<NaiveDateTime> {
        self.members.last().map(|&i| records[i].timestamp)
    }
}

/// Groups covering the capture sequence exactly once, in chronological order
/// of their first member.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub groups: Vec<Group>,
    /// Absolute threshold the partition was cut with; `None` when unsplit.
    pub threshold_secs: Option<f64>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

/// Main segmentation function: turns the sorted capture sequence into a
/// named partition under `policy`. Pure; safe to call on every policy edit.
pub fn segment_captures(
    records: &[CaptureRecord],
    gaps: &GapSeries,
    policy: &Policy,
    rule: &dyn CategoryRule,
) -> Result<Partition, PolicyError> {
    // Edge case: nothing to group
    if records.is_empty() {
        return Ok(Partition::default());
    }

    let Some(threshold) = policy.resolve_threshold(gaps)? else {
        return Ok(Partition {
            groups: vec![Group {
                members: (0..records.len()).collect(),
                name: UNSPLIT_GROUP_NAME.to_string(),
                category: None,
            }],
            threshold_secs: None,
        });
    };

    let mut groups = Vec::new();
    for span in named_spans(records, gaps, policy, threshold)? {
        let members: Vec<usize> = (span.start..=span.end).collect();

        if policy.category_split {
            for (label, bucket) in split_by_category(&members, records, rule) {
                groups.push(Group {
                    members: bucket,
                    name: format!("{}/{label}", span.name),
                    category: Some(label),
                });
            }
        } else {
            groups.push(Group {
                members,
                name: span.name,
                category: None,
            });
        }
    }

    Ok(Partition {
        groups,
        threshold_secs: Some(threshold),
    })
}

/// One temporal group before any category split.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSpan {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

/// Cut the sequence at `threshold` and name each span from the policy
/// template. Fails when two spans render to the same name or a name would
/// resolve outside the output root.
pub fn named_spans(
    records: &[CaptureRecord],
    gaps: &GapSeries,
    policy: &Policy,
    threshold: f64,
) -> Result<Vec<NamedSpan>, PolicyError> {
    let mut seen = HashSet::new();
    let mut spans = Vec::new();

    for (offset, (start, end)) in split_spans(gaps.as_slice(), threshold).into_iter().enumerate() {
        let ctx = NameContext {
            group_num: policy.first_group_number.saturating_add(offset as u32),
            start: records[start].timestamp,
            end: records[end].timestamp,
        };
        let name = render_name(&policy.name_template, &ctx);

        if !is_safe_group_name(&name) {
            return Err(PolicyError::UnsafeGroupName(name));
        }
        if !seen.insert(name.clone()) {
            return Err(PolicyError::DuplicateGroupName(name));
        }
        spans.push(NamedSpan { start, end, name });
    }

    Ok(spans)
}

/// `/` nests directories; anything that could climb out of the root or
/// smuggle in another separator is refused.
fn is_safe_group_name(name: &str) -> bool {
    name.split('/')
        .all(|segment| segment != "." && segment != ".." && !segment.contains('\\'))
}

/// Cut the sequence wherever a gap reaches `threshold`. Returns inclusive
/// `(start, end)` index spans. A gap exactly equal to the threshold is a break.
pub fn split_spans(gaps: &[i64], threshold: f64) -> Vec<(usize, usize)> {
    if gaps.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut start = 0;
    for (i, &gap) in gaps.iter().enumerate().skip(1) {
        if gap as f64 >= threshold {
            spans.push((start, i - 1));
            start = i;
        }
    }

    // Push final span; a trailing single capture stays on its own
    spans.push((start, gaps.len() - 1));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::category::ExtensionRule;
    use crate::segmentation::config::ThresholdUnit;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn records_at(offsets: &[(&str, i64)]) -> Vec<CaptureRecord> {
        let base = NaiveDate::from_ymd_opt(2017, 4, 19)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        offsets
            .iter()
            .map(|(id, secs)| CaptureRecord::new(*id, base + chrono::Duration::seconds(*secs), -123.0, 39.0))
            .collect()
    }

    fn absolute(threshold: f64) -> Policy {
        Policy {
            split_enabled: true,
            threshold_unit: ThresholdUnit::AbsoluteSeconds,
            threshold_value: threshold,
            ..Policy::default()
        }
    }

    fn member_sets(partition: &Partition) -> Vec<Vec<usize>> {
        partition.groups.iter().map(|g| g.members.clone()).collect()
    }

    fn assert_complete(partition: &Partition, n: usize) {
        let mut seen = HashSet::new();
        for group in &partition.groups {
            for &m in &group.members {
                assert!(seen.insert(m), "index {m} appears twice");
            }
        }
        assert_eq!(seen, (0..n).collect::<HashSet<_>>());
    }

    #[test]
    fn gap_equal_to_threshold_starts_new_group() {
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 10), ("c.jpg", 20)]);
        let gaps = GapSeries::from_records(&records).unwrap();

        // every gap is exactly 10, so every capture opens a group
        let partition = segment_captures(&records, &gaps, &absolute(10.0), &ExtensionRule::default()).unwrap();
        assert_eq!(member_sets(&partition), vec![vec![0], vec![1], vec![2]]);

        let partition = segment_captures(&records, &gaps, &absolute(10.5), &ExtensionRule::default()).unwrap();
        assert_eq!(member_sets(&partition), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn spans_break_on_ties() {
        assert_eq!(split_spans(&[0, 10, 5], 10.0), vec![(0, 0), (1, 2)]);
        assert_eq!(split_spans(&[0, 5, 10], 10.0), vec![(0, 1), (2, 2)]);
        assert!(split_spans(&[], 10.0).is_empty());
    }

    #[test]
    fn trailing_capture_keeps_its_own_group() {
        assert_eq!(split_spans(&[0, 5, 5, 100], 10.0), vec![(0, 2), (3, 3)]);

        let records = records_at(&[("a.jpg", 0), ("b.jpg", 5), ("c.jpg", 10), ("d.jpg", 110)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let partition = segment_captures(&records, &gaps, &absolute(10.0), &ExtensionRule::default()).unwrap();
        assert_eq!(member_sets(&partition), vec![vec![0, 1, 2], vec![3]]);
        assert_complete(&partition, 4);
    }

    #[test]
    fn unsplit_policy_yields_one_group() {
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 500), ("c.jpg", 9000)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            split_enabled: false,
            threshold_unit: ThresholdUnit::AbsoluteSeconds,
            threshold_value: 1.0,
            category_split: true,
            ..Policy::default()
        };

        let partition = segment_captures(&records, &gaps, &policy, &ExtensionRule::default()).unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.groups[0].name, UNSPLIT_GROUP_NAME);
        assert_eq!(partition.groups[0].members, vec![0, 1, 2]);
        assert_eq!(partition.threshold_secs, None);
    }

    #[test]
    fn names_follow_template_and_first_number() {
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 2100), ("c.jpg", 6000), ("d.jpg", 6060)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            name_template: "F{GroupNum}_{StartTime}_{EndTime}".into(),
            first_group_number: 7,
            ..absolute(1000.0)
        };

        let partition = segment_captures(&records, &gaps, &policy, &ExtensionRule::default()).unwrap();
        let names: Vec<&str> = partition.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["F07_1305_1305", "F08_1340_1340", "F09_1445_1446"]);
    }

    #[test]
    fn median_multiple_resolves_threshold() {
        // median gap is 2s, 10x median = 20s
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 2), ("c.jpg", 4), ("d.jpg", 24), ("e.jpg", 26)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            split_enabled: true,
            ..Policy::default()
        };

        let partition = segment_captures(&records, &gaps, &policy, &ExtensionRule::default()).unwrap();
        assert_eq!(partition.threshold_secs, Some(20.0));
        assert_eq!(member_sets(&partition), vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn undefined_median_is_reported() {
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 0)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            split_enabled: true,
            ..Policy::default()
        };
        assert_eq!(
            segment_captures(&records, &gaps, &policy, &ExtensionRule::default()),
            Err(PolicyError::UndefinedMedian)
        );
    }

    #[test]
    fn colliding_or_escaping_names_are_refused() {
        let records = records_at(&[("a.jpg", 0), ("b.jpg", 2), ("c.jpg", 3600)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let rule = ExtensionRule::default();

        let fixed = Policy {
            name_template: "Flight".into(),
            ..absolute(60.0)
        };
        assert_eq!(
            segment_captures(&records, &gaps, &fixed, &rule),
            Err(PolicyError::DuplicateGroupName("Flight".into()))
        );

        let escaping = Policy {
            name_template: "../../etc/F{GroupNum}".into(),
            ..absolute(60.0)
        };
        assert_eq!(
            segment_captures(&records, &gaps, &escaping, &rule),
            Err(PolicyError::UnsafeGroupName("../../etc/F01".into()))
        );

        let spans = named_spans(&records, &gaps, &absolute(60.0), 60.0).unwrap();
        assert_eq!(
            spans,
            vec![
                NamedSpan { start: 0, end: 1, name: "Flt01_1305_1305".into() },
                NamedSpan { start: 2, end: 2, name: "Flt02_1405_1405".into() },
            ]
        );
    }

    #[test]
    fn category_split_shares_group_number() {
        let records = records_at(&[
            ("IMG_1.JPG", 0),
            ("IMG_1.TIF", 0),
            ("IMG_2.JPG", 2),
            ("IMG_2.TIF", 2),
            ("IMG_3.TIF", 600),
        ]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            name_template: "Flt{GroupNum}".into(),
            category_split: true,
            ..absolute(60.0)
        };

        let partition = segment_captures(&records, &gaps, &policy, &ExtensionRule::default()).unwrap();
        let summary: Vec<(&str, Vec<usize>)> = partition
            .groups
            .iter()
            .map(|g| (g.name.as_str(), g.members.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Flt01/rgb", vec![0, 2]),
                ("Flt01/multispectral", vec![1, 3]),
                ("Flt02/multispectral", vec![4]),
            ]
        );
        assert_complete(&partition, 5);
    }

    #[test]
    fn segmentation_is_deterministic() {
        let records = records_at(&[("a.jpg", 0), ("b.tif", 3), ("c.jpg", 40), ("d.jpg", 41), ("e.tif", 90)]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let policy = Policy {
            category_split: true,
            ..absolute(30.0)
        };
        let rule = ExtensionRule::default();

        let first = segment_captures(&records, &gaps, &policy, &rule).unwrap();
        let second = segment_captures(&records, &gaps, &policy, &rule).unwrap();
        assert_eq!(first, second);
        assert_complete(&first, 5);
    }

    #[test]
    fn partition_is_complete_across_thresholds() {
        let records = records_at(&[
            ("a.jpg", 0),
            ("b.jpg", 1),
            ("c.tif", 1),
            ("d.jpg", 7),
            ("e.jpg", 30),
            ("f.tif", 31),
            ("g.jpg", 95),
        ]);
        let gaps = GapSeries::from_records(&records).unwrap();
        let rule = ExtensionRule::default();

        for threshold in [0.5, 1.0, 2.0, 6.0, 10.0, 23.0, 64.0, 1000.0] {
            for category_split in [false, true] {
                let policy = Policy {
                    category_split,
                    ..absolute(threshold)
                };
                let partition = segment_captures(&records, &gaps, &policy, &rule).unwrap();
                assert_complete(&partition, records.len());
                for group in &partition.groups {
                    assert!(!group.is_empty());
                    assert!(group.members.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }
}
