//! # Flags
//!
//! Named, runtime-resolvable configuration values.
//!
//! * [`FlagSource`] is the read capability consumers depend on; it resolves a
//!   name to a [`FlagValue`] and offers typed accessors with defaults.
//! * [`Flagset`] is a shared in-memory source whose values can be flipped at runtime.
//! * [`CachedFlags`] puts a TTL cache in front of any other source.
//! * [`load_flags`] and [`FlagsConfig`] build a [`Flagset`] from config files and
//!   environment overrides.
//!
//! ```rust
//! use ncr_flags::{CachedFlags, FlagSource, Flagset};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), ncr_flags::FlagError> {
//! let flags = Flagset::new();
//! flags.set("rollout_percent", 25_i64)?;
//!
//! let cached = CachedFlags::new(flags.clone(), Duration::from_secs(30));
//! assert_eq!(cached.get_int("rollout_percent", 0)?, 25);
//! # Ok(())
//! # }
//! ```

mod cached;
mod error;
mod flagset;
mod loader;
mod source;
mod value;

pub use crate::cached::CachedFlags;
pub use crate::error::{FlagError, FlagErrorExt};
pub use crate::flagset::Flagset;
pub use crate::loader::{ENV_PREFIX, FlagsConfig, load_flags};
pub use crate::source::FlagSource;
pub use crate::value::{FlagValue, parse_bool};
