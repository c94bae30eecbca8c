use crate::error::FlagError;
use crate::value::FlagValue;
use std::fmt::Debug;
use std::sync::Arc;

/// A source of named, runtime-resolvable flags.
///
/// Implementors only provide [`FlagSource::get`]; the typed accessors coerce
/// the raw value and fall back to `default` when the flag is not defined.
/// A defined flag that cannot be coerced is an error, not the default.
pub trait FlagSource: Send + Sync + Debug {
    /// Looks up the raw value of `name`. `Ok(None)` means the flag is not defined.
    ///
    /// # Errors
    /// Implementation specific; e.g. [`FlagError::Unavailable`] when a remote
    /// store cannot be reached.
    fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError>;

    /// # Errors
    /// [`FlagError::TypeMismatch`] if the value is not boolean-ish, or any
    /// error of [`FlagSource::get`].
    fn get_boolean(&self, name: &str, default: bool) -> Result<bool, FlagError> {
        self.get(name)?.map_or(Ok(default), |v| v.as_bool().ok_or_else(|| mismatch(name, "bool", &v)))
    }

    /// # Errors
    /// [`FlagError::TypeMismatch`] if the value is not an integer, or any
    /// error of [`FlagSource::get`].
    fn get_int(&self, name: &str, default: i64) -> Result<i64, FlagError> {
        self.get(name)?.map_or(Ok(default), |v| v.as_int().ok_or_else(|| mismatch(name, "int", &v)))
    }

    /// # Errors
    /// [`FlagError::TypeMismatch`] if the value is not numeric, or any error
    /// of [`FlagSource::get`].
    fn get_float(&self, name: &str, default: f64) -> Result<f64, FlagError> {
        self.get(name)?
            .map_or(Ok(default), |v| v.as_float().ok_or_else(|| mismatch(name, "float", &v)))
    }

    /// Every value has a string form, so this only fails when the lookup does.
    ///
    /// # Errors
    /// Any error of [`FlagSource::get`].
    fn get_string(&self, name: &str, default: &str) -> Result<String, FlagError> {
        Ok(self.get(name)?.map_or_else(|| default.to_owned(), |v| v.to_string()))
    }
}

fn mismatch(name: &str, expected: &str, value: &FlagValue) -> FlagError {
    FlagError::TypeMismatch {
        message: format!("expected {expected}, found {} `{value}`", value.kind()).into(),
        context: Some(format!("flag `{name}`").into()),
    }
}

macro_rules! forward_flag_source {
    ($($wrapper:ty),+ $(,)?) => {$(
        impl<T: FlagSource + ?Sized> FlagSource for $wrapper {
            fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError> {
                (**self).get(name)
            }

            fn get_boolean(&self, name: &str, default: bool) -> Result<bool, FlagError> {
                (**self).get_boolean(name, default)
            }

            fn get_int(&self, name: &str, default: i64) -> Result<i64, FlagError> {
                (**self).get_int(name, default)
            }

            fn get_float(&self, name: &str, default: f64) -> Result<f64, FlagError> {
                (**self).get_float(name, default)
            }

            fn get_string(&self, name: &str, default: &str) -> Result<String, FlagError> {
                (**self).get_string(name, default)
            }
        }
    )+};
}

forward_flag_source!(&T, Arc<T>, Box<T>);
