use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date/time layout used by EXIF `DateTimeOriginal`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// One timestamped, geolocated capture. Built once from a metadata row and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    /// File name, unique within a run.
    pub id: String,
    /// Camera-local capture time, second resolution.
    pub timestamp: NaiveDateTime,
    pub longitude: f64,
    pub latitude: f64,
}

impl CaptureRecord {
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            longitude,
            latitude,
        }
    }

    /// Lower-cased extension of the file id, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.id)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Parse an EXIF-style timestamp (`2017:04:19 13:20:01`).
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exif_timestamp() {
        let ts = parse_exif_datetime("2017:04:19 13:20:01").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2017-04-19 13:20:01");
    }

    #[test]
    fn rejects_malformed_timestamp() {
        assert!(parse_exif_datetime("2017-04-19 13:20:01").is_none());
        assert!(parse_exif_datetime("").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
    }

    #[test]
    fn extension_is_lowercased() {
        let ts = parse_exif_datetime("2017:04:19 13:20:01").unwrap();
        let record = CaptureRecord::new("IMG_0001.JPG", ts, -122.1, 38.9);
        assert_eq!(record.extension().as_deref(), Some("jpg"));

        let bare = CaptureRecord::new("README", ts, 0.0, 0.0);
        assert_eq!(bare.extension(), None);
    }
}
