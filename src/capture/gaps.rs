use serde::Serialize;

use crate::models::CaptureRecord;

use super::error::CaptureError;

/// Seconds elapsed between chronologically adjacent captures.
///
/// `gap[0]` is always zero; `gap[i]` is `timestamp[i] - timestamp[i - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapSeries {
    secs: Vec<i64>,
}

/// Summary shown to the operator. `None` where the statistic is undefined.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GapStats {
    pub min: Option<i64>,
    pub median: Option<f64>,
    pub max: Option<i64>,
}

impl GapSeries {
    /// Build the series from a time-sorted capture sequence.
    pub fn from_records(records: &[CaptureRecord]) -> Result<Self, CaptureError> {
        let first = records.first().ok_or(CaptureError::EmptyInput)?;

        let mut secs = Vec::with_capacity(records.len());
        secs.push(0);
        let mut previous = first.timestamp;
        for record in &records[1..] {
            let gap = (record.timestamp - previous).num_seconds();
            // sorted input never goes backwards; clamp anyway so the series stays non-negative
            secs.push(gap.max(0));
            previous = record.timestamp;
        }

        Ok(Self { secs })
    }

    /// Build directly from gap values. Used by tests and by callers that already
    /// have the series.
    pub fn from_secs(secs: Vec<i64>) -> Self {
        Self { secs }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.secs
    }

    pub fn len(&self) -> usize {
        self.secs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.secs.get(index).copied()
    }

    /// Typical sampling interval: median over the series with zero gaps removed.
    pub fn median(&self) -> Option<f64> {
        let values: Vec<f64> = self.secs.iter().map(|&gap| gap as f64).collect();
        median(&values, true)
    }

    /// Smallest gap, ignoring the leading zero.
    pub fn min(&self) -> Option<i64> {
        self.secs.iter().skip(1).copied().min()
    }

    /// Largest gap, ignoring the leading zero.
    pub fn max(&self) -> Option<i64> {
        self.secs.iter().skip(1).copied().max()
    }

    pub fn stats(&self) -> GapStats {
        GapStats {
            min: self.min(),
            median: self.median(),
            max: self.max(),
        }
    }
}

/// Classical median: middle element for odd length, mean of the two middle
/// elements for even length. Returns `None` for an empty input (after zero
/// removal when `omit_zeros` is set).
pub fn median(values: &[f64], omit_zeros: bool) -> Option<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .copied()
        .filter(|value| !omit_zeros || *value != 0.0)
        .collect();

    let n = sorted.len();
    if n == 0 {
        return None;
    }

    sorted.sort_by(|a, b| a.total_cmp(b));
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_at(id: &str, secs: i64) -> CaptureRecord {
        let base = NaiveDate::from_ymd_opt(2017, 4, 19)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        CaptureRecord::new(id, base + chrono::Duration::seconds(secs), 0.0, 0.0)
    }

    #[test]
    fn median_skips_zero_gaps() {
        let gaps = GapSeries::from_secs(vec![0, 4, 4, 10]);
        assert_eq!(gaps.median(), Some(4.0));
    }

    #[test]
    fn median_even_length_averages_middle_pair() {
        assert_eq!(median(&[3.0, 1.0, 4.0, 2.0], false), Some(2.5));
        assert_eq!(median(&[0.0, 2.0, 0.0, 6.0], true), Some(4.0));
    }

    #[test]
    fn median_of_only_zeros_is_undefined() {
        assert_eq!(median(&[0.0, 0.0, 0.0], true), None);
        assert_eq!(median(&[0.0, 0.0, 0.0], false), Some(0.0));
        assert_eq!(median(&[], false), None);
    }

    #[test]
    fn series_from_records() {
        let records = vec![record_at("a", 0), record_at("b", 2), record_at("c", 2), record_at("d", 9)];
        let gaps = GapSeries::from_records(&records).unwrap();
        assert_eq!(gaps.as_slice(), &[0, 2, 0, 7]);
        assert_eq!(gaps.min(), Some(0));
        assert_eq!(gaps.max(), Some(7));
        assert_eq!(gaps.median(), Some(4.5));
    }

    #[test]
    fn single_record_yields_single_zero() {
        let gaps = GapSeries::from_records(&[record_at("a", 0)]).unwrap();
        assert_eq!(gaps.as_slice(), &[0]);
        assert_eq!(gaps.stats(), GapStats { min: None, median: None, max: None });
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(GapSeries::from_records(&[]), Err(CaptureError::EmptyInput)));
    }
}
