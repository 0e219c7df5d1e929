//! Capture metadata rows as produced by the external extraction tool.

pub mod exiftool;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureError;

pub use exiftool::ExifTool;

pub const TAG_FILE_NAME: &str = "FileName";
pub const TAG_DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const TAG_LATITUDE: &str = "GPSLatitude";
pub const TAG_LONGITUDE: &str = "GPSLongitude";

/// A tag value. exiftool emits numbers with `-n`, but string output has to be
/// accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Number(_) => None,
        }
    }
}

/// One metadata row. Fields are optional at this level; the capture store
/// decides which absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataRow {
    #[serde(rename = "SourceFile")]
    pub source_file: Option<String>,
    #[serde(rename = "FileName")]
    pub file_name: Option<String>,
    #[serde(rename = "DateTimeOriginal")]
    pub date_time_original: Option<FieldValue>,
    #[serde(rename = "GPSLatitude")]
    pub gps_latitude: Option<FieldValue>,
    #[serde(rename = "GPSLongitude")]
    pub gps_longitude: Option<FieldValue>,
}

impl MetadataRow {
    /// Best available identifier for messages about this row.
    pub fn label(&self, index: usize) -> String {
        self.file_name
            .clone()
            .or_else(|| self.source_file.clone())
            .unwrap_or_else(|| format!("row {}", index + 1))
    }
}

/// Anything that can produce metadata rows for a directory of captures.
pub trait MetadataSource {
    fn read_rows(&self, dir: &Path) -> Result<Vec<MetadataRow>, CaptureError>;
}

/// Parse the JSON array written by `exiftool -json`.
pub fn parse_rows(json: &str) -> Result<Vec<MetadataRow>, CaptureError> {
    // exiftool prints nothing at all when no file in the directory was readable
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}
