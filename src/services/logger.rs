use crate::constants::env::{GITHUB_ACTIONS, LOG_LEVEL, RUNNER_DEBUG};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn from_env() -> Self {
        if std::env::var(RUNNER_DEBUG).map(|v| v == "1").unwrap_or(false) {
            return LogLevel::Debug;
        }
        LogLevel::parse(&std::env::var(LOG_LEVEL).unwrap_or_else(|_| "info".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn allows(self, other: LogLevel) -> bool {
        other <= self
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// How lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    /// GitHub Actions workflow commands, so errors and warnings become annotations.
    Actions,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var(GITHUB_ACTIONS) {
            Ok(v) if v.eq_ignore_ascii_case("true") => LogFormat::Actions,
            _ => LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    format: LogFormat,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::from_env(),
            format: LogFormat::from_env(),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            format: self.format,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn format_line(&self, level: LogLevel, message: &str, meta: Option<&Value>) -> String {
        let meta_suffix = meta
            .filter(|m| !m.is_null())
            .map(|m| format!(" {}", m))
            .unwrap_or_default();
        match self.format {
            LogFormat::Actions => {
                let body = escape_workflow_data(&format!(
                    "[{}] {}{}",
                    self.context, message, meta_suffix
                ));
                match level {
                    LogLevel::Error => format!("::error::{}", body),
                    LogLevel::Warn => format!("::warning::{}", body),
                    LogLevel::Debug => format!("::debug::{}", body),
                    LogLevel::Info => body,
                }
            }
            LogFormat::Plain => format!(
                "[{}] {} [{}] {}{}",
                chrono::Utc::now().to_rfc3339(),
                level.label(),
                self.context,
                message,
                meta_suffix
            ),
        }
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        if !self.level.allows(level) {
            return;
        }
        eprintln!("{}", self.format_line(level, message, meta));
    }

    pub fn error(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Debug, message, meta);
    }
}

// Workflow commands end at the first newline unless it is escaped.
fn escape_workflow_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
