//! Per-host measurement record

use crate::{
    error::AppError,
    stats,
    target::Target,
    types::CheckMode,
};
use std::time::Duration;

/// One monitored host and everything measured about it.
///
/// Samples are append-only and keep attempt order. `last_error` holds only the
/// most recent failed attempt; a record with no samples and an error never
/// succeeded. A failed pre-wave lookup is kept apart and dropped once a later
/// lookup produces a target.
#[derive(Debug, Clone)]
pub struct HostRecord {
    name: String,
    host_id: String,
    check_mode: CheckMode,
    samples: Vec<Duration>,
    last_error: Option<AppError>,
    resolution_error: Option<AppError>,
    failures: u32,
    target: Option<Target>,
}

impl HostRecord {
    /// Create a record for a catalog entry
    pub fn new<N: Into<String>, H: Into<String>>(name: N, host_id: H) -> Self {
        Self {
            name: name.into(),
            host_id: host_id.into(),
            check_mode: CheckMode::Tcp,
            samples: Vec::new(),
            last_error: None,
            resolution_error: None,
            failures: 0,
            target: None,
        }
    }

    /// Display label (region or site name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hostname fragment used to build requests
    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn check_mode(&self) -> CheckMode {
        self.check_mode
    }

    /// Successful durations in attempt order
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Most recent failed attempt, else an unresolved pre-wave lookup error
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref().or(self.resolution_error.as_ref())
    }

    /// Number of attempts that produced no sample
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Total attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.samples.len() as u32 + self.failures
    }

    /// Append a successful measurement
    pub fn record_sample(&mut self, duration: Duration) {
        self.samples.push(duration);
    }

    /// Record a failed attempt, replacing any earlier error
    pub fn record_failure(&mut self, error: AppError) {
        self.failures += 1;
        self.last_error = Some(error);
    }

    /// Mean latency in milliseconds, `NaN` without samples
    pub fn average_ms(&self) -> f64 {
        stats::average_ms(&self.samples)
    }

    /// Latency text for summary listings.
    ///
    /// The stored error text replaces the figure whenever an attempt failed.
    pub fn latency_display(&self) -> String {
        match self.last_error() {
            Some(error) => error.to_string(),
            None => format_ms(self.average_ms()),
        }
    }

    /// Average column text for the per-attempt breakdown
    pub fn average_display(&self) -> String {
        match (self.last_error(), self.samples.is_empty()) {
            (Some(error), true) => error.to_string(),
            _ => format_ms(self.average_ms()),
        }
    }

    pub(crate) fn set_check_mode(&mut self, mode: CheckMode) {
        self.check_mode = mode;
    }

    /// Error raised while building the target before any wave ran.
    ///
    /// Not counted as an attempt; every wave will still try this host.
    pub(crate) fn set_resolution_error(&mut self, error: AppError) {
        self.resolution_error = Some(error);
    }

    /// Assign the target, clearing any earlier lookup error
    pub(crate) fn set_target(&mut self, target: Target) {
        self.target = Some(target);
        self.resolution_error = None;
    }
}

/// Format a millisecond value the way every listing prints latency
pub fn format_ms(ms: f64) -> String {
    format!("{:.2} ms", ms)
}
