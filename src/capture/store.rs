use std::collections::HashSet;

use crate::metadata::{
    MetadataRow, TAG_DATE_TIME_ORIGINAL, TAG_FILE_NAME, TAG_LATITUDE, TAG_LONGITUDE,
};
use crate::models::capture::{parse_exif_datetime, CaptureRecord};

use super::error::{CaptureError, SkippedRow};
use super::gaps::GapSeries;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Time-sorted capture sequence for one run.
#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    records: Vec<CaptureRecord>,
    skipped: Vec<SkippedRow>,
}

impl CaptureStore {
    /// Build the sequence from metadata rows.
    ///
    /// A required tag that no row carries aborts the whole load. A row that
    /// lacks a tag, or whose timestamp or coordinates don't parse, is skipped
    /// and reported. Records are sorted by timestamp; equal timestamps keep
    /// input order.
    pub fn load(rows: &[MetadataRow]) -> Result<Self, CaptureError> {
        check_columns(rows)?;

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            let label = row.label(index);

            let Some(file_name) = row.file_name.as_deref() else {
                skip(&mut skipped, &label, format!("no {TAG_FILE_NAME}"));
                continue;
            };
            let (Some(raw_time), Some(raw_lat), Some(raw_lon)) =
                (&row.date_time_original, &row.gps_latitude, &row.gps_longitude)
            else {
                skip(&mut skipped, file_name, format!("missing {}", missing_tags(row).join(", ")));
                continue;
            };

            let Some(timestamp) = raw_time.as_text().and_then(parse_exif_datetime) else {
                skip(&mut skipped, file_name, format!("unparseable {TAG_DATE_TIME_ORIGINAL} {raw_time:?}"));
                continue;
            };
            let (Some(latitude), Some(longitude)) = (raw_lat.as_f64(), raw_lon.as_f64()) else {
                skip(&mut skipped, file_name, "unparseable GPS coordinates".to_string());
                continue;
            };
            if !seen.insert(file_name.to_string()) {
                skip(&mut skipped, file_name, "duplicate file name".to_string());
                continue;
            }

            records.push(CaptureRecord::new(file_name, timestamp, longitude, latitude));
        }

        // sort_by_key is stable, so ties stay in input order
        records.sort_by_key(|record| record.timestamp);

        log_info!(
            "Loaded {} capture(s), skipped {}",
            records.len(),
            skipped.len()
        );

        Ok(Self { records, skipped })
    }

    pub fn records(&self) -> &[CaptureRecord] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Gap series over the sorted sequence; `EmptyInput` when nothing loaded.
    pub fn gaps(&self) -> Result<GapSeries, CaptureError> {
        GapSeries::from_records(&self.records)
    }
}

/// Fails on the first required tag that appears in none of the rows.
fn check_columns(rows: &[MetadataRow]) -> Result<(), CaptureError> {
    if rows.is_empty() {
        return Ok(());
    }

    let columns: [(&'static str, fn(&MetadataRow) -> bool); 4] = [
        (TAG_FILE_NAME, |row| row.file_name.is_some()),
        (TAG_DATE_TIME_ORIGINAL, |row| row.date_time_original.is_some()),
        (TAG_LATITUDE, |row| row.gps_latitude.is_some()),
        (TAG_LONGITUDE, |row| row.gps_longitude.is_some()),
    ];

    match columns.iter().find(|(_, present)| !rows.iter().any(present)) {
        Some((field, _)) => Err(CaptureError::MissingField { field: *field }),
        None => Ok(()),
    }
}

fn missing_tags(row: &MetadataRow) -> Vec<&'static str> {
    [
        (TAG_DATE_TIME_ORIGINAL, row.date_time_original.is_none()),
        (TAG_LATITUDE, row.gps_latitude.is_none()),
        (TAG_LONGITUDE, row.gps_longitude.is_none()),
    ]
    .into_iter()
    .filter_map(|(tag, missing)| missing.then_some(tag))
    .collect()
}

fn skip(skipped: &mut Vec<SkippedRow>, file: &str, reason: String) {
    log_warn!("Skipping {}: {}", file, reason);
    skipped.push(SkippedRow {
        file: file.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_rows, FieldValue};

    fn row(name: &str, time: &str, lat: f64, lon: f64) -> MetadataRow {
        MetadataRow {
            source_file: Some(format!("/data/{name}")),
            file_name: Some(name.to_string()),
            date_time_original: Some(FieldValue::Text(time.to_string())),
            gps_latitude: Some(FieldValue::Number(lat)),
            gps_longitude: Some(FieldValue::Number(lon)),
        }
    }

    #[test]
    fn sorts_by_timestamp_and_keeps_tie_order() {
        let rows = vec![
            row("c.jpg", "2017:04:19 13:00:10", 1.0, 2.0),
            row("a.jpg", "2017:04:19 13:00:00", 1.0, 2.0),
            row("b2.jpg", "2017:04:19 13:00:05", 1.0, 2.0),
            row("b1.jpg", "2017:04:19 13:00:05", 1.0, 2.0),
        ];

        let store = CaptureStore::load(&rows).unwrap();
        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.jpg", "b2.jpg", "b1.jpg", "c.jpg"]);
        assert_eq!(store.gaps().unwrap().as_slice(), &[0, 5, 0, 5]);
    }

    #[test]
    fn bad_timestamp_is_skipped_not_fatal() {
        let rows = vec![
            row("a.jpg", "2017:04:19 13:00:00", 1.0, 2.0),
            row("b.jpg", "not a time", 1.0, 2.0),
        ];

        let store = CaptureStore::load(&rows).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped().len(), 1);
        assert_eq!(store.skipped()[0].file, "b.jpg");
    }

    #[test]
    fn bad_coordinates_and_duplicates_are_skipped() {
        let mut bad = row("b.jpg", "2017:04:19 13:00:01", 1.0, 2.0);
        bad.gps_latitude = Some(FieldValue::Text("n/a".into()));
        let rows = vec![
            row("a.jpg", "2017:04:19 13:00:00", 1.0, 2.0),
            bad,
            row("a.jpg", "2017:04:19 13:00:02", 1.0, 2.0),
        ];

        let store = CaptureStore::load(&rows).unwrap();
        assert_eq!(store.len(), 1);
        let reasons: Vec<&str> = store.skipped().iter().map(|s| s.reason.as_str()).collect();
        assert_eq!(reasons, vec!["unparseable GPS coordinates", "duplicate file name"]);
    }

    #[test]
    fn untagged_row_is_skipped() {
        // exiftool omits absent keys, e.g. for the settings file next to the images
        let rows = parse_rows(
            r#"[
                {"FileName": "a.jpg", "DateTimeOriginal": "2017:04:19 13:00:00", "GPSLatitude": 1.0, "GPSLongitude": 2.0},
                {"FileName": "flightsort.json"},
                {"FileName": "b.jpg", "DateTimeOriginal": "2017:04:19 13:00:02", "GPSLatitude": 1.0, "GPSLongitude": 2.0}
            ]"#,
        )
        .unwrap();

        let store = CaptureStore::load(&rows).unwrap();
        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.jpg", "b.jpg"]);
        assert_eq!(
            store.skipped(),
            &[SkippedRow {
                file: "flightsort.json".into(),
                reason: "missing DateTimeOriginal, GPSLatitude, GPSLongitude".into(),
            }]
        );
    }

    #[test]
    fn row_without_file_name_is_skipped() {
        let mut nameless = row("b.jpg", "2017:04:19 13:00:01", 1.0, 2.0);
        nameless.file_name = None;
        let rows = vec![row("a.jpg", "2017:04:19 13:00:00", 1.0, 2.0), nameless];

        let store = CaptureStore::load(&rows).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped()[0].file, "/data/b.jpg");
    }

    #[test]
    fn tag_absent_from_every_row_aborts_load() {
        let mut first = row("a.jpg", "2017:04:19 13:00:00", 1.0, 2.0);
        let mut second = row("b.jpg", "2017:04:19 13:00:01", 1.0, 2.0);
        first.gps_longitude = None;
        second.gps_longitude = None;

        match CaptureStore::load(&[first, second]) {
            Err(CaptureError::MissingField { field }) => assert_eq!(field, TAG_LONGITUDE),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn empty_store_has_no_gaps() {
        let store = CaptureStore::load(&[]).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.gaps(), Err(CaptureError::EmptyInput)));
    }
}
