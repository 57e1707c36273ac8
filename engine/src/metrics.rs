//! Running metric over every processed file.
//!
//! [`update`] is a pure function of the prior record and one new sample.
//! Loading the prior record and storing the result atomically is up to the
//! caller (see [`crate::persist::MetricStore`]).

use crate::config::round3;
use crate::frequency::FrequencyMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningMetric {
    pub files_processed: u64,
    /// RFC 3339 time of the latest update.
    pub latest_file_processed_timestamp: String,
    // absent or null time aggregates load as NaN, which `update` replaces
    // with the incoming sample
    #[serde(default = "unset", deserialize_with = "nullable_f64")]
    pub min_time_processed: f64,
    #[serde(default = "unset", deserialize_with = "nullable_f64")]
    pub avg_time_processed: f64,
    #[serde(default = "unset", deserialize_with = "nullable_f64")]
    pub max_time_processed: f64,
    pub total_file_size_mb: f64,
    pub avg_file_size_mb: f64,
    /// Occurrences of every word across all processed files.
    pub word_counts: HashMap<String, u64>,
}

impl Default for RunningMetric {
    fn default() -> Self {
        Self {
            files_processed: 0,
            latest_file_processed_timestamp: String::new(),
            min_time_processed: unset(),
            avg_time_processed: unset(),
            max_time_processed: unset(),
            total_file_size_mb: 0.0,
            avg_file_size_mb: 0.0,
            word_counts: HashMap::new(),
        }
    }
}

impl RunningMetric {
    /// Add one file's word counts to the tally.
    pub fn record_words(&mut self, freq: &FrequencyMap) {
        for (word, &n) in freq {
            *self.word_counts.entry(word.clone()).or_insert(0) += n as u64;
        }
    }

    /// The `n` most frequent words, highest count first, ties by word.
    pub fn top_words(&self, n: usize) -> Vec<(String, u64)> {
        let mut words: Vec<(String, u64)> = self.word_counts.iter().map(|(w, c)| (w.clone(), *c)).collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(n);
        words
    }
}

/// Fold one processed file into the running metric, stamped with the
/// current UTC time.
pub fn update(prior: Option<&RunningMetric>, processing_time: f64, file_size_mb: f64) -> RunningMetric {
    update_at(prior, processing_time, file_size_mb, OffsetDateTime::now_utc())
}

/// [`update`] with an explicit timestamp.
pub fn update_at(
    prior: Option<&RunningMetric>,
    processing_time: f64,
    file_size_mb: f64,
    now: OffsetDateTime,
) -> RunningMetric {
    let processing_time = sanitize(processing_time);
    let file_size_mb = sanitize(file_size_mb);
    let timestamp = now.format(&Rfc3339).unwrap_or_default();

    let prior = match prior {
        // a record that never counted a file carries no usable aggregates
        Some(p) if p.files_processed > 0 => p,
        other => {
            return RunningMetric {
                files_processed: 1,
                latest_file_processed_timestamp: timestamp,
                min_time_processed: round3(processing_time),
                avg_time_processed: round3(processing_time),
                max_time_processed: round3(processing_time),
                total_file_size_mb: round3(file_size_mb),
                avg_file_size_mb: round3(file_size_mb),
                word_counts: other.map(|p| p.word_counts.clone()).unwrap_or_default(),
            };
        }
    };

    let n = prior.files_processed + 1;
    let prior_min = finite_or(prior.min_time_processed, processing_time);
    let prior_max = finite_or(prior.max_time_processed, processing_time);
    let prior_avg = finite_or(prior.avg_time_processed, processing_time);
    let total_size = sanitize(prior.total_file_size_mb) + file_size_mb;

    RunningMetric {
        files_processed: n,
        latest_file_processed_timestamp: timestamp,
        min_time_processed: round3(prior_min.min(processing_time)),
        max_time_processed: round3(prior_max.max(processing_time)),
        avg_time_processed: round3((prior_avg * (n - 1) as f64 + processing_time) / n as f64),
        total_file_size_mb: round3(total_size),
        avg_file_size_mb: round3(total_size / n as f64),
        word_counts: prior.word_counts.clone(),
    }
}

/// Elapsed processing time in seconds, rounded to milliseconds.
pub fn processing_seconds(elapsed: Duration) -> f64 {
    round3(elapsed.as_secs_f64())
}

/// File size in MB (1024 * 1024 bytes), rounded to 3 decimals.
pub fn file_size_mb(bytes: u64) -> f64 {
    round3(bytes as f64 / BYTES_PER_MB)
}

fn unset() -> f64 { f64::NAN }

fn nullable_f64<'de, D: Deserializer<'de>>(d: D) -> core::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or_else(unset))
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn first_sample_initializes() {
        let m = update_at(None, 1.234, 2.5, datetime!(2024-01-01 00:00 UTC));
        assert_eq!(m.files_processed, 1);
        assert_eq!(m.min_time_processed, 1.234);
        assert_eq!(m.avg_time_processed, 1.234);
        assert_eq!(m.max_time_processed, 1.234);
        assert_eq!(m.total_file_size_mb, 2.5);
        assert_eq!(m.avg_file_size_mb, 2.5);
        assert_eq!(m.latest_file_processed_timestamp, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn second_sample_aggregates() {
        let first = update(None, 1.234, 2.5);
        let m = update(Some(&first), 2.0, 1.5);
        assert_eq!(m.files_processed, 2);
        assert_eq!(m.min_time_processed, 1.234);
        assert_eq!(m.max_time_processed, 2.0);
        assert_eq!(m.avg_time_processed, 1.617);
        assert_eq!(m.total_file_size_mb, 4.0);
        assert_eq!(m.avg_file_size_mb, 2.0);
    }

    #[test]
    fn empty_prior_is_treated_as_first() {
        let m = update(Some(&RunningMetric::default()), 0.5, 1.0);
        assert_eq!(m.files_processed, 1);
        assert_eq!(m.min_time_processed, 0.5);
    }

    #[test]
    fn malformed_prior_fields_fall_back() {
        let prior = RunningMetric { files_processed: 3, min_time_processed: f64::NAN, ..Default::default() };
        let m = update(Some(&prior), 0.25, 0.0);
        assert_eq!(m.files_processed, 4);
        assert_eq!(m.min_time_processed, 0.25);
        assert!(m.avg_time_processed.is_finite());
    }

    #[test]
    fn conversions() {
        assert_eq!(file_size_mb(1024 * 1024), 1.0);
        assert_eq!(file_size_mb(1536 * 1024), 1.5);
        assert_eq!(processing_seconds(Duration::from_micros(1_234_400)), 1.234);
    }

    #[test]
    fn top_words_by_count() {
        let mut m = RunningMetric::default();
        m.record_words(&crate::frequency::count(&["b", "a", "b", "c"]));
        m.record_words(&crate::frequency::count(&["c", "c"]));
        assert_eq!(m.top_words(2), vec![("c".to_string(), 3), ("b".to_string(), 2)]);
    }

    #[test]
    fn missing_fields_deserialize_with_defaults() {
        let m: RunningMetric = serde_json::from_str(r#"{"files_processed": 2}"#).unwrap();
        assert_eq!(m.files_processed, 2);
        assert!(m.word_counts.is_empty());
        assert_eq!(m.total_file_size_mb, 0.0);
    }

    #[test]
    fn absent_time_aggregates_take_the_new_sample() {
        let prior: RunningMetric = serde_json::from_str(r#"{"files_processed": 2}"#).unwrap();
        let m = update(Some(&prior), 1.5, 1.0);
        assert_eq!(m.files_processed, 3);
        assert_eq!(m.min_time_processed, 1.5);
        assert_eq!(m.avg_time_processed, 1.5);
        assert_eq!(m.max_time_processed, 1.5);
    }

    #[test]
    fn null_time_aggregates_take_the_new_sample() {
        let prior: RunningMetric =
            serde_json::from_str(r#"{"files_processed": 1, "min_time_processed": null, "max_time_processed": 4.0}"#)
                .unwrap();
        let m = update(Some(&prior), 2.0, 0.5);
        assert_eq!(m.min_time_processed, 2.0);
        assert_eq!(m.max_time_processed, 4.0);
    }
}
