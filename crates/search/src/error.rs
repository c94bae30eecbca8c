use ncr_flags::FlagError;
use std::borrow::Cow;

/// A specialized [`SearchError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid qname{}: {message}", format_context(.context))]
    InvalidQName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid node ref{}: {message}", format_context(.context))]
    InvalidNodeRef { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid search request{}: {message}", format_context(.context))]
    InvalidRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage not found{}: {message}", format_context(.context))]
    StorageNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A flag lookup failed while deciding whether writes are allowed.
    #[error("Flag lookup failure{}: {source}", format_context(.context))]
    Flags { source: FlagError, context: Option<Cow<'static, str>> },

    #[error("Internal search fault{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Adds `.context(..)` to results that carry (or convert into) a [`SearchError`].
pub trait SearchErrorExt<T> {
    /// # Errors
    /// Returns the original error, converted into [`SearchError`], with `context` attached.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SearchError>;
}

impl<T> SearchErrorExt<T> for Result<T, SearchError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                SearchError::InvalidQName { context: c, .. }
                | SearchError::InvalidNodeRef { context: c, .. }
                | SearchError::InvalidRequest { context: c, .. }
                | SearchError::StorageNotFound { context: c, .. }
                | SearchError::Flags { context: c, .. }
                | SearchError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> SearchErrorExt<T> for Result<T, FlagError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SearchError> {
        self.map_err(|source| SearchError::Flags { source, context: Some(context.into()) })
    }
}

impl From<FlagError> for SearchError {
    #[inline]
    fn from(source: FlagError) -> Self {
        Self::Flags { source, context: None }
    }
}

impl From<&'static str> for SearchError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for SearchError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
