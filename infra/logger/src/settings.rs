use crate::error::LoggerError;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;

pub(crate) const DEFAULT_MAX_FILES: usize = 10;

/// How often the file appender starts a new log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPolicy> for Rotation {
    fn from(policy: RotationPolicy) -> Self {
        match policy {
            RotationPolicy::Minutely => Self::MINUTELY,
            RotationPolicy::Hourly => Self::HOURLY,
            RotationPolicy::Daily => Self::DAILY,
            RotationPolicy::Never => Self::NEVER,
        }
    }
}

/// Deserializable logger options, meant to live in a `[logger]` config table.
///
/// ```toml
/// [logger]
/// level = "debug"
/// filter = "ncr_search=trace"
/// path = "/var/log/ncr"
/// json = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// Default level directive (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `ncr_search=trace`.
    pub filter: Option<String>,
    /// Compact, ANSI-colored output on stderr.
    pub console: bool,
    /// Directory for rolling log files; file output is off when unset.
    pub path: Option<PathBuf>,
    /// Write file output as JSON lines.
    pub json: bool,
    pub rotation: RotationPolicy,
    pub max_files: usize,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            path: None,
            json: false,
            rotation: RotationPolicy::default(),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl LoggerSettings {
    /// Parses [`LoggerSettings::level`].
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(self.level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("unknown level '{}': {e}", self.level).into(),
            context: Some("logger.level".into()),
        })
    }
}
