//! Latency aggregation and host ranking

use crate::models::HostRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// Convert a duration to fractional milliseconds
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Arithmetic mean of the samples in milliseconds.
///
/// Returns `NaN` for an empty slice; callers treat that as "no data".
pub fn average_ms(samples: &[Duration]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let total: f64 = samples.iter().copied().map(duration_to_ms).sum();
    total / samples.len() as f64
}

/// Order two averages ascending, with `NaN` after every real value.
///
/// Two `NaN`s compare equal so a stable sort keeps their catalog order.
pub fn compare_averages(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Sort hosts by ascending average latency.
///
/// Stable: hosts with equal averages, and all hosts without samples, keep
/// their catalog order. Hosts without samples go last.
pub fn rank(hosts: &mut [HostRecord]) {
    hosts.sort_by(|a, b| compare_averages(a.average_ms(), b.average_ms()));
}

/// Aggregate outcome of a measurement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of hosts measured
    pub host_count: usize,
    /// Attempts made across all hosts and waves
    pub total_attempts: u32,
    /// Attempts that produced a sample
    pub successful_attempts: u32,
    /// Attempts that failed
    pub failed_attempts: u32,
    /// Hosts that never produced a sample
    pub unreachable_hosts: usize,
    /// Success rate as a percentage
    pub success_rate: f64,
    /// Name of the host with the lowest average, if any has data
    pub fastest: Option<String>,
}

impl RunSummary {
    /// Summarize a collection of measured hosts
    pub fn from_hosts(hosts: &[HostRecord]) -> Self {
        let successful_attempts: u32 = hosts.iter().map(|h| h.samples().len() as u32).sum();
        let failed_attempts: u32 = hosts.iter().map(|h| h.failures()).sum();
        let total_attempts = successful_attempts + failed_attempts;

        let success_rate = if total_attempts > 0 {
            (successful_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        };

        let fastest = hosts
            .iter()
            .filter(|h| !h.samples().is_empty())
            .min_by(|a, b| compare_averages(a.average_ms(), b.average_ms()))
            .map(|h| h.name().to_string());

        Self {
            host_count: hosts.len(),
            total_attempts,
            successful_attempts,
            failed_attempts,
            unreachable_hosts: hosts.iter().filter(|h| h.samples().is_empty()).count(),
            success_rate,
            fastest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use proptest::prelude::*;

    fn host(name: &str, samples_ms: &[u64]) -> HostRecord {
        let mut record = HostRecord::new(name, name.to_lowercase());
        for ms in samples_ms {
            record.record_sample(Duration::from_millis(*ms));
        }
        record
    }

    fn failed(name: &str) -> HostRecord {
        let mut record = HostRecord::new(name, name.to_lowercase());
        record.record_failure(AppError::connect("connection refused"));
        record
    }

    fn names(hosts: &[HostRecord]) -> Vec<&str> {
        hosts.iter().map(|h| h.name()).collect()
    }

    #[test]
    fn test_average_of_samples() {
        let samples = [
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ];
        assert_eq!(average_ms(&samples), 20.0);
        assert_eq!(format!("{:.2} ms", average_ms(&samples)), "20.00 ms");
    }

    #[test]
    fn test_average_keeps_sub_millisecond_precision() {
        let samples = [Duration::from_micros(1500), Duration::from_micros(500)];
        assert!((average_ms(&samples) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_of_nothing_is_nan() {
        assert!(average_ms(&[]).is_nan());
    }

    #[test]
    fn test_compare_averages_puts_nan_last() {
        assert_eq!(compare_averages(1.0, 2.0), Ordering::Less);
        assert_eq!(compare_averages(f64::NAN, 2.0), Ordering::Greater);
        assert_eq!(compare_averages(2.0, f64::NAN), Ordering::Less);
        assert_eq!(compare_averages(f64::NAN, f64::NAN), Ordering::Equal);
    }

    #[test]
    fn test_rank_three_hosts_with_one_failure() {
        let mut hosts = vec![host("A", &[50]), host("B", &[10]), failed("C")];
        rank(&mut hosts);
        assert_eq!(names(&hosts), vec!["B", "A", "C"]);
        assert_eq!(hosts[2].latency_display(), "Connect error: connection refused");
    }

    #[test]
    fn test_rank_is_stable_for_ties_and_failures() {
        let mut hosts = vec![
            failed("F1"),
            host("T1", &[25]),
            failed("F2"),
            host("T2", &[25]),
            host("Fast", &[5]),
        ];
        rank(&mut hosts);
        assert_eq!(names(&hosts), vec!["Fast", "T1", "T2", "F1", "F2"]);
    }

    #[test]
    fn test_summary() {
        let mut partial = host("P", &[40]);
        partial.record_failure(AppError::timeout("slow"));
        let hosts = vec![host("A", &[50, 60]), partial, failed("C")];

        let summary = RunSummary::from_hosts(&hosts);
        assert_eq!(summary.host_count, 3);
        assert_eq!(summary.total_attempts, 5);
        assert_eq!(summary.successful_attempts, 3);
        assert_eq!(summary.failed_attempts, 2);
        assert_eq!(summary.unreachable_hosts, 1);
        assert!((summary.success_rate - 60.0).abs() < 1e-9);
        assert_eq!(summary.fastest.as_deref(), Some("P"));
    }

    #[test]
    fn test_summary_of_empty_run() {
        let summary = RunSummary::from_hosts(&[]);
        assert_eq!(summary.total_attempts, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.fastest.is_none());
    }

    proptest! {
        #[test]
        fn prop_rank_orders_defined_means_and_keeps_failures_in_order(
            entries in proptest::collection::vec(proptest::option::of(1u64..500), 0..20)
        ) {
            let mut hosts: Vec<HostRecord> = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| match entry {
                    Some(ms) => host(&format!("H{}", i), &[*ms]),
                    None => failed(&format!("H{}", i)),
                })
                .collect();
            let failed_before: Vec<String> = hosts
                .iter()
                .filter(|h| h.samples().is_empty())
                .map(|h| h.name().to_string())
                .collect();

            rank(&mut hosts);

            let first_nan = hosts.iter().position(|h| h.average_ms().is_nan()).unwrap_or(hosts.len());
            prop_assert!(hosts[first_nan..].iter().all(|h| h.average_ms().is_nan()));
            for pair in hosts[..first_nan].windows(2) {
                prop_assert!(pair[0].average_ms() <= pair[1].average_ms());
            }
            let failed_after: Vec<String> = hosts[first_nan..]
                .iter()
                .map(|h| h.name().to_string())
                .collect();
            prop_assert_eq!(failed_before, failed_after);
        }

        #[test]
        fn prop_average_matches_mean(samples in proptest::collection::vec(0u64..1_000_000, 1..10)) {
            let durations: Vec<Duration> = samples.iter().map(|us| Duration::from_micros(*us)).collect();
            let expected = samples.iter().map(|us| *us as f64 / 1000.0).sum::<f64>() / samples.len() as f64;
            prop_assert!((average_ms(&durations) - expected).abs() < 1e-6);
        }
    }
}
