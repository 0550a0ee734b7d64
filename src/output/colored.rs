//! Terminal colors for result listings

use super::formatter::CellStyle;
use colored::*;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    /// Determine performance level from an average in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub error: Color,
    pub excellent: Color,
    pub good: Color,
    pub fair: Color,
    pub poor: Color,
    pub very_poor: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            error: Color::Red,
            excellent: Color::Green,
            good: Color::Cyan,
            fair: Color::Yellow,
            poor: Color::Magenta,
            very_poor: Color::Red,
        }
    }
}

impl ColorScheme {
    pub fn for_level(&self, level: PerformanceLevel) -> Color {
        match level {
            PerformanceLevel::Excellent => self.excellent,
            PerformanceLevel::Good => self.good,
            PerformanceLevel::Fair => self.fair,
            PerformanceLevel::Poor => self.poor,
            PerformanceLevel::VeryPoor => self.very_poor,
        }
    }
}

/// Colors latencies by performance level and errors in red
#[derive(Debug, Clone, Default)]
pub struct ColoredStyle {
    scheme: ColorScheme,
}

impl ColoredStyle {
    pub fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }
}

impl CellStyle for ColoredStyle {
    fn header(&self, text: String) -> String {
        text.color(self.scheme.header).bold().to_string()
    }

    fn latency(&self, ms: f64, text: String) -> String {
        let level = PerformanceLevel::from_response_time(ms);
        text.color(self.scheme.for_level(level)).to_string()
    }

    fn error(&self, text: String) -> String {
        text.color(self.scheme.error).to_string()
    }
}
