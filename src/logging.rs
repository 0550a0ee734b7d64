//! Structured logging for webping
//!
//! Log entries carry a level, logger name, optional correlation id and
//! arbitrary structured fields. Output goes to stderr so it never mixes with
//! the result listing on stdout. Console format is the default; debug mode
//! switches to one JSON object per line.

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::types::CheckMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger writing structured entries to stderr
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    enabled: bool,
    use_color: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Warn,
            enabled: true,
            use_color: true,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Debug mode lowers the threshold to `Debug` and switches to JSON
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: if config.debug { LogLevel::Debug } else { LogLevel::Warn },
            enabled: true,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// A logger that drops everything, for tests and library callers
    pub fn silent() -> Self {
        let mut logger = Self::new("SILENT".to_string());
        logger.enabled = false;
        logger
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Add a field to every subsequent entry
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
        };

        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }
}

/// Builder for a single log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error", error.to_string())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Events emitted while resolving targets and running waves
#[derive(Clone)]
pub struct ProbeLogger {
    logger: Logger,
    run_id: String,
}

impl ProbeLogger {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Logger::silent())
    }

    /// Correlation id shared by every event of one run
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_run_start(&self, mode: CheckMode, hosts: usize, repeats: u32) {
        self.logger.debug("Measurement run started")
            .correlation_id(&self.run_id)
            .field("mode", mode.as_str())
            .field("hosts", hosts)
            .field("repeats", repeats)
            .log()
            .await;
    }

    pub async fn log_mode_downgrade(&self, requested: CheckMode, used: CheckMode) {
        self.logger.warn(&format!(
            "{} is not available in this build, probing with {}",
            requested, used
        ))
            .correlation_id(&self.run_id)
            .field("requested_mode", requested.as_str())
            .field("mode", used.as_str())
            .log()
            .await;
    }

    pub async fn log_resolution(&self, host: &str, result: &Result<String>) {
        match result {
            Ok(target) => {
                self.logger.debug("Target resolved")
                    .correlation_id(&self.run_id)
                    .field("host", host)
                    .field("target", target)
                    .log()
                    .await;
            }
            Err(error) => {
                self.logger.warn(&format!("Target resolution failed for {}", host))
                    .correlation_id(&self.run_id)
                    .field("host", host)
                    .error_info(error)
                    .log()
                    .await;
            }
        }
    }

    pub async fn log_probe(&self, host: &str, wave: u32, result: &Result<Duration>) {
        match result {
            Ok(duration) => {
                self.logger.debug("Probe completed")
                    .correlation_id(&self.run_id)
                    .field("host", host)
                    .field("wave", wave)
                    .field("latency_ms", crate::stats::duration_to_ms(*duration))
                    .log()
                    .await;
            }
            Err(error) => {
                self.logger.log(failure_level(error), "Probe failed")
                    .correlation_id(&self.run_id)
                    .field("host", host)
                    .field("wave", wave)
                    .error_info(error)
                    .log()
                    .await;
            }
        }
    }

    pub async fn log_wave_complete(&self, wave: u32, successes: usize, failures: usize, elapsed: Duration) {
        self.logger.debug(&format!("Wave {} complete", wave))
            .correlation_id(&self.run_id)
            .field("wave", wave)
            .field("successes", successes)
            .field("failures", failures)
            .field("elapsed_ms", crate::stats::duration_to_ms(elapsed))
            .log()
            .await;
    }

    pub async fn log_run_complete(&self, probes: usize, elapsed: Duration) {
        self.logger.debug("Measurement run complete")
            .correlation_id(&self.run_id)
            .field("probes", probes)
            .field("elapsed_ms", crate::stats::duration_to_ms(elapsed))
            .log()
            .await;
    }
}

/// Network failures are routine per-host outcomes; anything else is a fault
fn failure_level(error: &AppError) -> LogLevel {
    if error.is_probe_failure() {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    }
}

/// Creates loggers sharing one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::new(self.create_logger("PROBE").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
