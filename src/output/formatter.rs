//! Column layout for result listings

use crate::models::HostRecord;

/// Placeholder for an attempt that produced no sample
pub const MISSING_CELL: &str = "-";

/// Styling applied to already padded cells.
///
/// Cells are padded before styling so escape codes never skew column widths.
pub trait CellStyle {
    fn header(&self, text: String) -> String {
        text
    }

    /// A latency figure; `ms` is the value the text shows
    fn latency(&self, _ms: f64, text: String) -> String {
        text
    }

    fn error(&self, text: String) -> String {
        text
    }
}

/// No styling at all
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyle;

impl CellStyle for PlainStyle {}

/// Lays out host listings at each verbosity
#[derive(Debug, Clone, Default)]
pub struct TableFormatter<S: CellStyle> {
    style: S,
}

impl<S: CellStyle> TableFormatter<S> {
    pub fn new(style: S) -> Self {
        Self { style }
    }

    /// `host  name`, one line per host, nothing measured
    pub fn format_regions(&self, hosts: &[HostRecord]) -> String {
        hosts
            .iter()
            .map(|h| format!("{:<15} {}\n", h.host_id(), h.name()))
            .collect()
    }

    /// `name  latency`
    pub fn format_summary(&self, hosts: &[HostRecord]) -> String {
        hosts
            .iter()
            .map(|h| {
                format!("{:<25} {}\n", h.name(), self.latency_cell(h, 20))
            })
            .collect()
    }

    /// Header, then `index  host  name  latency`
    pub fn format_detailed(&self, hosts: &[HostRecord]) -> String {
        let header = format!("{:>5} {:<15} {:<30} {:>20}", "", "Host", "Region", "Latency");
        let mut out = format!("{}\n", self.style.header(header));

        for (i, h) in hosts.iter().enumerate() {
            out.push_str(&format!(
                "{:>5} {:<15} {:<30} {}\n",
                i,
                h.host_id(),
                h.name(),
                self.latency_cell(h, 20)
            ));
        }
        out
    }

    /// Header, then one column per attempt and the average.
    ///
    /// Samples fill the leading attempt columns in order; attempts without a
    /// sample print as `-`. Column `N` is the `N`th successful sample, not
    /// wave `N`: a failure in wave 1 followed by a success in wave 2 prints
    /// the sample under `Try #1` and `-` under `Try #2`.
    pub fn format_breakdown(&self, hosts: &[HostRecord], repeats: u32) -> String {
        let mut header = format!("{:>5} {:<15} {:<25}", "", "Host", "Region");
        for attempt in 1..=repeats {
            header.push_str(&format!(" {:>15}", format!("Try #{}", attempt)));
        }
        header.push_str(&format!(" {:>15}", "Avg Latency"));
        let mut out = format!("{}\n", self.style.header(header));

        for (i, h) in hosts.iter().enumerate() {
            let mut line = format!("{:>5} {:<15} {:<25}", i, h.host_id(), h.name());
            for attempt in 0..repeats as usize {
                let cell = h
                    .samples()
                    .get(attempt)
                    .map(|d| crate::models::host::format_ms(crate::stats::duration_to_ms(*d)))
                    .unwrap_or_else(|| MISSING_CELL.to_string());
                line.push_str(&format!(" {:>15}", cell));
            }
            let average = if h.samples().is_empty() {
                self.style.error(format!("{:>15}", h.average_display()))
            } else {
                self.style.latency(h.average_ms(), format!("{:>15}", h.average_display()))
            };
            line.push(' ');
            line.push_str(&average);
            line.push('\n');
            out.push_str(&line);
        }
        out
    }

    /// Summary latency, or the stored error when any attempt failed
    fn latency_cell(&self, host: &HostRecord, width: usize) -> String {
        let text = format!("{:>width$}", host.latency_display(), width = width);
        match host.last_error() {
            Some(_) => self.style.error(text),
            None => self.style.latency(host.average_ms(), text),
        }
    }
}
