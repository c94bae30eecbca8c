use crate::cached::CachedFlags;
use crate::error::{FlagError, FlagErrorExt};
use crate::flagset::Flagset;
use crate::value::FlagValue;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Environment prefix for flag overrides, e.g. `NCR_FLAGS__VALUES__MY_FLAG=true`.
pub const ENV_PREFIX: &str = "NCR_FLAGS";

/// Static flag definitions, typically the `[flags]` table of a config file.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Initial values keyed by flag name.
    pub values: BTreeMap<String, FlagValue>,
    /// When set, lookups are cached for this many seconds.
    pub cache_ttl_seconds: Option<u64>,
}

impl FlagsConfig {
    /// Builds a [`Flagset`] holding the configured values.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidName`] if any configured name is invalid.
    pub fn to_flagset(&self) -> Result<Flagset, FlagError> {
        let flags = Flagset::new();
        flags.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())))?;
        Ok(flags)
    }

    /// Like [`FlagsConfig::to_flagset`], wrapped in a [`CachedFlags`] when
    /// `cache_ttl_seconds` is set.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidName`] if any configured name is invalid.
    pub fn to_source(&self) -> Result<Box<dyn crate::FlagSource>, FlagError> {
        let flags = self.to_flagset()?;
        Ok(match self.cache_ttl_seconds {
            Some(ttl) => Box::new(CachedFlags::new(flags, Duration::from_secs(ttl))),
            None => Box::new(flags),
        })
    }
}

/// Loads a standalone flags file layered with `NCR_FLAGS__` environment overrides.
///
/// The file must exist. Nested keys use a double underscore, so
/// `NCR_FLAGS__VALUES__NCR_SEARCH_INDEXING_DISABLED=true` sets
/// `values.ncr_search_indexing_disabled`.
///
/// # Errors
/// Returns [`FlagError::Config`] if the file is missing or malformed, and
/// [`FlagError::InvalidName`] if it defines an invalid flag name.
///
/// # Example
/// ```rust,no_run
/// use ncr_flags::{FlagSource, load_flags};
///
/// let flags = load_flags("flags.toml").unwrap();
/// let disabled = flags.get_boolean("ncr_search_indexing_disabled", false).unwrap();
/// ```
pub fn load_flags(path: impl AsRef<Path>) -> Result<Flagset, FlagError> {
    let path = path.as_ref();
    info!("Loading flags from {}", path.display());

    let config: FlagsConfig = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context(format!("Failed to build flags from {}", path.display()))?
        .try_deserialize()
        .context("Failed to deserialize flags")?;

    config.to_flagset()
}
