use fxhash::FxHashMap;
use std::fmt::Debug;

/// Read access to process-level environment variables.
pub trait Environment: Send + Sync + Debug {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, for embedding hosts and tests.
///
/// ```rust
/// use ncr_search::{Environment, StaticEnvironment};
///
/// let env = StaticEnvironment::new().with("NCR_SEARCH_INDEXING_DISABLED", "1");
/// assert_eq!(env.var("NCR_SEARCH_INDEXING_DISABLED").as_deref(), Some("1"));
/// assert_eq!(env.var("HOME"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: FxHashMap<String, String>,
}

impl StaticEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
