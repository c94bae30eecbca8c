use std::borrow::Cow;

/// Errors raised while reading or loading flags.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    /// The stored value cannot be read as the requested type.
    #[error("Flag type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Flag names must be non-empty and restricted to `[A-Za-z0-9_.:-]`.
    #[error("Invalid flag name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The backing store could not answer.
    #[error("Flag source unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Layered file/environment loading failed.
    #[error("Flag config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Adds `.context(..)` to results that carry (or convert into) a [`FlagError`].
pub trait FlagErrorExt<T> {
    /// Attaches a human-readable context to the error, if any.
    ///
    /// # Errors
    /// Returns the original error, converted into [`FlagError`], with `context` attached.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, FlagError>;
}

impl<T> FlagErrorExt<T> for Result<T, FlagError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                FlagError::TypeMismatch { context: c, .. }
                | FlagError::InvalidName { context: c, .. }
                | FlagError::Unavailable { context: c, .. }
                | FlagError::Config { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> FlagErrorExt<T> for Result<T, config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, FlagError> {
        self.map_err(|source| FlagError::Config { source, context: Some(context.into()) })
    }
}

impl From<config::ConfigError> for FlagError {
    #[inline]
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
