//! # ncr
//!
//! Administrative tooling for the node content repository: reindex node
//! exports, run queries and inspect flags.
//!
//! The tool runs in the administrative execution context, so indexing is
//! only suppressed when `NCR_SEARCH_INDEXING_DISABLED` is truthy. Pass
//! `--service` to gate on the configured flag source instead.

pub mod args;
pub mod commands;
pub mod settings;

pub use crate::args::{Cli, Command};
pub use crate::commands::run;
pub use crate::settings::{Settings, load_settings};
