//! Error handling for webping

use thiserror::Error;

/// Custom error types for webping
///
/// Errors raised while measuring a single host (`Resolution`, `Connect`,
/// `Request`, `Timeout`) are stored on that host's record and never abort
/// the run. The remaining variants come from configuration, catalog loading
/// and the command line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address or URL could not be built, or DNS lookup failed
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// TCP dial failed
    #[error("Connect error: {0}")]
    Connect(String),

    /// HTTP transport failed
    #[error("Request error: {0}")]
    Request(String),

    /// Probe exceeded its deadline
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new resolution error
    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution(message.into())
    }

    /// Create a new connect error
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::Connect(message.into())
    }

    /// Create a new request error
    pub fn request<S: Into<String>>(message: S) -> Self {
        Self::Request(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Resolution(_) => "RESOLVE",
            Self::Connect(_) => "CONNECT",
            Self::Request(_) => "REQUEST",
            Self::Timeout(_) => "TIMEOUT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error was produced by a probe attempt against one host
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Self::Resolution(_) | Self::Connect(_) | Self::Request(_) | Self::Timeout(_)
        )
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Resolution(_) | Self::Connect(_) | Self::Request(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Resolution(_) | Self::Connect(_) | Self::Request(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else {
            Self::request(error.to_string())
        }
    }
}

impl From<trust_dns_resolver::error::ResolveError> for AppError {
    fn from(error: trust_dns_resolver::error::ResolveError) -> Self {
        Self::resolution(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its category
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                AppError::Config(msg) => AppError::Config(format!("{}: {}", context, msg)),
                AppError::Resolution(msg) => AppError::Resolution(format!("{}: {}", context, msg)),
                AppError::Connect(msg) => AppError::Connect(format!("{}: {}", context, msg)),
                AppError::Request(msg) => AppError::Request(format!("{}: {}", context, msg)),
                AppError::Timeout(msg) => AppError::Timeout(format!("{}: {}", context, msg)),
                AppError::Validation(msg) => AppError::Validation(format!("{}: {}", context, msg)),
                AppError::Io(msg) => AppError::Io(format!("{}: {}", context, msg)),
                AppError::Parse(msg) => AppError::Parse(format!("{}: {}", context, msg)),
                AppError::Internal(msg) => AppError::Internal(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Error reporter for user feedback on fatal errors
pub struct ErrorReporter {
    pub use_color: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Report an error to the user on stderr
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true)
    }
}
