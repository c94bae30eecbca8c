use serde::Deserialize;
use std::fmt;

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];
const FALSY: [&str; 5] = ["", "0", "false", "no", "off"];

/// A dynamically typed flag value.
///
/// Deserialization is untagged: `true` becomes [`FlagValue::Bool`], `3` becomes
/// [`FlagValue::Int`], `0.5` becomes [`FlagValue::Float`] and anything else a
/// [`FlagValue::String`]. Values that arrive as text (environment variables)
/// are coerced on read by the typed accessors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FlagValue {
    /// Reads the value as a boolean.
    ///
    /// Numbers are `true` when non-zero; strings go through [`parse_bool`].
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::String(s) => parse_bool(s),
        }
    }

    /// Reads the value as an integer. Floats must have no fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::String(s) => s.trim().parse().ok(),
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().parse().ok(),
        }
    }

    /// Name of the stored variant, used in mismatch messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Parses a boolean-ish word.
///
/// `1`, `true`, `yes`, `on` are `true`; empty, `0`, `false`, `no`, `off` are
/// `false` (ASCII case-insensitive, surrounding whitespace ignored). Anything
/// else is `None`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let word = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&word.as_str()) {
        Some(true)
    } else if FALSY.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_words() {
        for word in ["1", "true", "TRUE", " yes ", "On"] {
            assert_eq!(parse_bool(word), Some(true), "{word:?}");
        }
        for word in ["", "0", "false", "No", "OFF"] {
            assert_eq!(parse_bool(word), Some(false), "{word:?}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn numeric_coercions() {
        assert_eq!(FlagValue::Int(0).as_bool(), Some(false));
        assert_eq!(FlagValue::Float(0.25).as_bool(), Some(true));
        assert_eq!(FlagValue::Float(3.0).as_int(), Some(3));
        assert_eq!(FlagValue::Float(3.5).as_int(), None);
        assert_eq!(FlagValue::from(" 42 ").as_int(), Some(42));
        assert_eq!(FlagValue::Bool(true).as_float(), Some(1.0));
    }

    #[test]
    fn untagged_deserialization_picks_narrowest_variant() {
        let values: Vec<FlagValue> =
            serde_json::from_str(r#"[true, 7, 1.5, "on"]"#).expect("flag values");
        assert_eq!(
            values,
            vec![
                FlagValue::Bool(true),
                FlagValue::Int(7),
                FlagValue::Float(1.5),
                FlagValue::String("on".to_owned()),
            ]
        );
    }
}
