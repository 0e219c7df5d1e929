use serde::{Deserialize, Serialize};

use crate::models::CaptureRecord;

/// Maps a capture to a file-category label. Swappable so the segmentation
/// code stays agnostic of file-format conventions.
pub trait CategoryRule {
    /// Labels in the order buckets should be emitted.
    fn bucket_order(&self) -> Vec<String>;

    fn classify(&self, record: &CaptureRecord) -> String;
}

/// One named bucket and the extensions that land in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub label: String,
    pub extensions: Vec<String>,
}

/// Extension lookup table with a catch-all bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionRule {
    pub buckets: Vec<CategoryBucket>,
    pub fallback: String,
}

impl Default for ExtensionRule {
    fn default() -> Self {
        Self {
            buckets: vec![
                CategoryBucket {
                    label: "rgb".into(),
                    extensions: vec!["jpg".into(), "jpeg".into(), "png".into(), "dng".into()],
                },
                CategoryBucket {
                    label: "multispectral".into(),
                    extensions: vec!["tif".into(), "tiff".into()],
                },
            ],
            fallback: "other".into(),
        }
    }
}

impl CategoryRule for ExtensionRule {
    fn bucket_order(&self) -> Vec<String> {
        let mut order: Vec<String> = self.buckets.iter().map(|b| b.label.clone()).collect();
        if !order.contains(&self.fallback) {
            order.push(self.fallback.clone());
        }
        order
    }

    fn classify(&self, record: &CaptureRecord) -> String {
        let Some(ext) = record.extension() else {
            return self.fallback.clone();
        };

        self.buckets
            .iter()
            .find(|bucket| bucket.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .map(|bucket| bucket.label.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Partition `members` into category buckets. Empty buckets are dropped;
/// members keep their relative order inside each bucket. Labels the rule
/// didn't list in `bucket_order` are appended in first-seen order.
pub fn split_by_category(
    members: &[usize],
    records: &[CaptureRecord],
    rule: &dyn CategoryRule,
) -> Vec<(String, Vec<usize>)> {
    let mut buckets: Vec<(String, Vec<usize>)> = rule
        .bucket_order()
        .into_iter()
        .map(|label| (label, Vec::new()))
        .collect();

    for &index in members {
        let label = rule.classify(&records[index]);
        match buckets.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, bucket)) => bucket.push(index),
            None => buckets.push((label, vec![index])),
        }
    }

    buckets.retain(|(_, bucket)| !bucket.is_empty());
    buckets
}
