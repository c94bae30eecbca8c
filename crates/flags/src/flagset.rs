//! In-memory, runtime-mutable flag store.

use crate::error::FlagError;
use crate::source::FlagSource;
use crate::value::FlagValue;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// A thread-safe, shared set of flags.
///
/// Cloning is cheap and every clone observes the same values, so one handle
/// can be given to a consumer while another keeps flipping flags at runtime.
///
/// # Example
///
/// ```rust
/// use ncr_flags::{FlagSource, Flagset};
///
/// # fn main() -> Result<(), ncr_flags::FlagError> {
/// let flags = Flagset::new();
/// flags.set("ncr_search_indexing_disabled", true)?;
///
/// assert!(flags.get_boolean("ncr_search_indexing_disabled", false)?);
/// assert_eq!(flags.get_int("missing", 7)?, 7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flagset {
    values: Arc<RwLock<FxHashMap<String, FlagValue>>>,
}

impl Flagset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the previous value.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidName`] if `name` is empty or contains
    /// characters outside `[A-Za-z0-9_.:-]`.
    pub fn set(
        &self,
        name: impl Into<String>,
        value: impl Into<FlagValue>,
    ) -> Result<Option<FlagValue>, FlagError> {
        let name = name.into();
        validate_name(&name)?;
        let value = value.into();
        debug!(flag = %name, %value, "Flag set");
        Ok(self.values.write().insert(name, value))
    }

    /// Removes `name`, returning its value if it was defined.
    pub fn remove(&self, name: &str) -> Option<FlagValue> {
        self.values.write().remove(name)
    }

    /// Inserts every pair, validating all names before touching the store.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidName`] for the first invalid name; nothing is
    /// inserted in that case.
    pub fn extend<I, K, V>(&self, flags: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FlagValue>,
    {
        let pending = flags
            .into_iter()
            .map(|(k, v)| {
                let name = k.into();
                validate_name(&name).map(|()| (name, v.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.values.write().extend(pending);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Sorted list of defined flag names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl FlagSource for Flagset {
    fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError> {
        Ok(self.values.read().get(name).cloned())
    }
}

fn validate_name(name: &str) -> Result<(), FlagError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(FlagError::InvalidName { message: format!("`{name}`").into(), context: None })
    }
}
