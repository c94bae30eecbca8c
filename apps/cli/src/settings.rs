use config::{Config, ConfigError, Environment, File};
use ncr_flags::FlagsConfig;
use ncr_logger::LoggerSettings;
use ncr_search::GatingConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "ncr.toml";

/// Environment prefix for settings overrides, e.g. `NCR__LOGGER__LEVEL=debug`.
pub const ENV_PREFIX: &str = "NCR";

/// Everything `ncr` reads from its settings file.
///
/// ```toml
/// [logger]
/// level = "debug"
///
/// [flags]
/// cache_ttl_seconds = 30
///
/// [flags.values]
/// ncr_search_indexing_disabled = true
///
/// [search]
/// env_override = "NCR_SEARCH_INDEXING_DISABLED"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logger: LoggerSettings,
    pub flags: FlagsConfig,
    pub search: GatingConfig,
}

/// Loads [`Settings`] from a file overlaid with `NCR__`-prefixed environment
/// variables (`__` separates nested keys).
///
/// An explicit `path` must exist. Without one, [`DEFAULT_SETTINGS_FILE`] is
/// read if present and defaults apply otherwise.
///
/// # Errors
/// Returns a [`ConfigError`] if the file is missing or does not match [`Settings`].
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = path.map_or_else(
        || File::from(Path::new(DEFAULT_SETTINGS_FILE)).required(false),
        |p| File::from(p).required(true),
    );

    let settings = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize::<Settings>()?;

    info!(
        path = %path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE)).display(),
        flags = settings.flags.values.len(),
        "Loaded settings"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncr_flags::{FlagSource, FlagValue};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_all_tables() {
        let file = settings_file(
            r#"
            [logger]
            level = "warn"
            console = false
            path = "/tmp/ncr-logs"

            [flags.values]
            ncr_search_indexing_disabled = true
            batch_size = 50

            [search]
            flag_name = "search_writes_off"
            "#,
        );

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.logger.level, "warn");
        assert!(!settings.logger.console);
        assert_eq!(
            settings.flags.values.get("ncr_search_indexing_disabled"),
            Some(&FlagValue::Bool(true))
        );
        assert_eq!(settings.search.flag_name, "search_writes_off");
        assert_eq!(settings.search.env_override, ncr_search::DEFAULT_ENV_OVERRIDE);

        let flags = settings.flags.to_source().unwrap();
        assert_eq!(flags.get_int("batch_size", 0).unwrap(), 50);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = settings_file("");
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.search, GatingConfig::default());
        assert_eq!(settings.logger, LoggerSettings::default());
        assert!(settings.flags.values.is_empty());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_settings(Some(&missing)).is_err());
    }
}
