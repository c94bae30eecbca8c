//! # Logger
//!
//! Installs the global `tracing` subscriber for ncr tools.
//!
//! Console output is compact and goes to stderr, so a tool's stdout stays
//! free for its own results. File output rolls over through
//! `tracing-appender` on a non-blocking worker, optionally as JSON lines.
//! `RUST_LOG` is honored unless an explicit filter is configured.
//!
//! Configure either through the [`Logger::builder`] typestate builder or from
//! a deserialized [`LoggerSettings`] table with [`Logger::from_settings`].
//!
//! ## Example
//!
//! ```rust
//! # use ncr_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("ncr")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod settings;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::settings::{LoggerSettings, RotationPolicy};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use crate::settings::DEFAULT_MAX_FILES;
use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

impl TryFrom<&LoggerSettings> for LoggerConfig {
    type Error = LoggerError;

    fn try_from(settings: &LoggerSettings) -> Result<Self, LoggerError> {
        Ok(Self {
            console: settings.console,
            path: settings.path.clone(),
            level: settings.level_filter()?,
            rotation: settings.rotation.into(),
            max_files: settings.max_files,
            json: settings.json,
            env_filter: settings.filter.clone(),
        })
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
///
/// A name is required before [`LoggerBuilder::init`] is available; file-only
/// options unlock after [`LoggerBuilder::path`].
#[derive(Debug)]
#[allow(private_bounds)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: PhantomData<F>,
}

#[allow(private_bounds)]
impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the logger name, also used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { name: WithName(name.into()), config: self.config, file_state: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Maximum number of rolled files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes file output as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

#[allow(private_bounds)]
impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Minimum level emitted when no directive matches.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Explicit filter directives (e.g., `ncr_search=trace,ncr_flags=debug`).
    ///
    /// Replaces `RUST_LOG`. Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables or disables the stderr console layer.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Directory for rolling log files. Created on init if missing.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: PhantomData }
    }

    /// Consumes the builder and installs the global tracing subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the
    /// file worker.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber is already set,
    /// [`LoggerError::InvalidConfiguration`] for invalid settings, and
    /// [`LoggerError::Appender`] when the log directory cannot be used.
    pub fn init(self) -> Result<Logger, LoggerError> {
        install(&self.name.0, self.config)
    }
}

/// A handle to the initialized logging system.
///
/// Holds the non-blocking file worker guard, if file output is enabled.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName, file_state: PhantomData }
    }

    /// Installs the global subscriber from a deserialized settings table.
    ///
    /// ```rust
    /// use ncr_logger::{Logger, LoggerSettings};
    ///
    /// let settings = LoggerSettings { level: "debug".into(), ..LoggerSettings::default() };
    /// let _logger = Logger::from_settings("ncr", &settings).unwrap();
    /// ```
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`].
    pub fn from_settings(name: &str, settings: &LoggerSettings) -> Result<Self, LoggerError> {
        install(name, LoggerConfig::try_from(settings)?)
    }

    /// Returns the file worker guard, if file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Logging system shutting down, flushing buffers");
        }
    }
}

fn install(name: &str, config: LoggerConfig) -> Result<Logger, LoggerError> {
    validate_config(&config, name)?;

    let env_filter = build_env_filter(&config)?;
    let mut layers = Vec::new();

    if config.console {
        layers.push(layer().compact().with_ansi(true).with_writer(std::io::stderr).boxed());
    }

    let guard = if let Some(path) = config.path {
        fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to create path: {}", path.display()).into()),
        })?;

        let file_appender = RollingFileAppender::builder()
            .rotation(config.rotation)
            .filename_prefix(name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(config.max_files)
            .build(path)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = layer().with_writer(non_blocking).with_ansi(false);

        layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

    Ok(Logger { guard })
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    if !config.console && config.path.is_none() {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging layers enabled. Enable console or file output.".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builder_initial_state() {
        let builder = Logger::builder().name("ncr-test").env_filter("ncr_search=debug");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.env_filter.as_deref(), Some("ncr_search=debug"));
        assert!(builder.config.path.is_none());
    }

    #[test]
    fn builder_file_options() -> Result<(), std::io::Error> {
        let tmp_dir = tempdir()?;
        let log_dir = tmp_dir.path().join("logs");
        let builder = Logger::builder()
            .name("ncr-test")
            .console(false)
            .path(log_dir.clone())
            .max_files(5)
            .rotation(Rotation::HOURLY)
            .json();

        assert!(!builder.config.console);
        assert!(builder.config.json);
        assert_eq!(builder.config.max_files, 5);
        assert_eq!(builder.config.rotation, Rotation::HOURLY);
        assert_eq!(builder.config.path.as_deref(), Some(log_dir.as_path()));
        Ok(())
    }

    #[test]
    fn settings_convert_into_config() -> Result<(), LoggerError> {
        let settings = LoggerSettings {
            level: "warn".to_owned(),
            filter: Some("ncr_flags=trace".to_owned()),
            rotation: RotationPolicy::Never,
            ..LoggerSettings::default()
        };
        let config = LoggerConfig::try_from(&settings)?;
        assert_eq!(config.level, LevelFilter::WARN);
        assert_eq!(config.rotation, Rotation::NEVER);
        assert_eq!(config.env_filter.as_deref(), Some("ncr_flags=trace"));
        Ok(())
    }

    #[test]
    fn rejects_configurations_without_output() {
        let config = LoggerConfig { console: false, ..LoggerConfig::default() };
        assert!(matches!(
            validate_config(&config, "ncr"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(validate_config(&LoggerConfig::default(), " ").is_err());
        let config = LoggerConfig { max_files: 0, ..LoggerConfig::default() };
        assert!(validate_config(&config, "ncr").is_err());
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config =
            LoggerConfig { env_filter: Some("ncr=shouting".to_owned()), ..LoggerConfig::default() };
        let err = build_env_filter(&config).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("Invalid env filter"), "{err}");
    }
}
