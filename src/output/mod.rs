//! Output formatting and display
//!
//! Result listings go to stdout in one of four layouts chosen by
//! [`Verbosity`], optionally colored by performance level.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredStyle, PerformanceLevel};
pub use formatter::{CellStyle, PlainStyle, TableFormatter, MISSING_CELL};

use crate::{error::Result, models::HostRecord, types::Verbosity};
use std::io::Write;

/// Renders measured hosts at a given verbosity
#[derive(Debug, Clone)]
pub struct LatencyOutput {
    verbosity: Verbosity,
    repeats: u32,
    use_color: bool,
}

impl LatencyOutput {
    pub fn new(verbosity: Verbosity, repeats: u32, use_color: bool) -> Self {
        Self {
            verbosity,
            repeats,
            use_color,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Render the listing as a string
    pub fn render(&self, hosts: &[HostRecord]) -> String {
        if self.use_color {
            self.render_with(&TableFormatter::new(ColoredStyle::default()), hosts)
        } else {
            self.render_with(&TableFormatter::new(PlainStyle), hosts)
        }
    }

    fn render_with<S: CellStyle>(&self, formatter: &TableFormatter<S>, hosts: &[HostRecord]) -> String {
        match self.verbosity {
            Verbosity::Regions => formatter.format_regions(hosts),
            Verbosity::Summary => formatter.format_summary(hosts),
            Verbosity::Detailed => formatter.format_detailed(hosts),
            Verbosity::Breakdown => formatter.format_breakdown(hosts, self.repeats),
        }
    }

    /// Write the listing to `writer`
    pub fn show<W: Write>(&self, hosts: &[HostRecord], writer: &mut W) -> Result<()> {
        writer.write_all(self.render(hosts).as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
