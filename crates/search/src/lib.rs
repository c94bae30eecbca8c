//! Node search for the content repository.
//!
//! The crate defines the [`SearchBackend`] capability (storage provisioning,
//! node indexing and deletion, query execution) together with the values that
//! flow through it, and [`GatedSearchFacade`], a backend wrapper that turns
//! writes into silent no-ops while indexing is disabled.
//!
//! # Architectural Overview
//!
//! 1.  **[`SearchBackend`]**: the capability every backend and wrapper implements.
//! 2.  **[`GatedSearchFacade`]**: consults a [`ncr_flags::FlagSource`] (service
//!     traffic) or an environment override (administrative tooling) once, then
//!     drops or forwards `index_nodes`/`delete_nodes` accordingly.
//! 3.  **[`MemorySearch`]**: an in-process backend partitioned by tenant and [`QName`].
//! 4.  **[`ParsedQuery`]**: the small query language backends evaluate.
//!
//! # Examples
//!
//! ```rust
//! use ncr_flags::Flagset;
//! use ncr_search::{
//!     Context, ExecutionContext, GatedSearchFacade, MemorySearch, Node, SearchBackend,
//!     StaticEnvironment,
//! };
//!
//! # fn main() -> Result<(), ncr_search::SearchError> {
//! // Normal traffic is read-only...
//! let flags = Flagset::new();
//! flags.set("ncr_search_indexing_disabled", true)?;
//!
//! // ...but a reindex job still writes unless the override is set.
//! let backend = MemorySearch::new();
//! let reindex = GatedSearchFacade::builder()
//!     .flags(flags)
//!     .backend(backend.clone())
//!     .context(ExecutionContext::Administrative)
//!     .environment(StaticEnvironment::new())
//!     .build();
//!
//! let node = Node::new("acme:article:1".parse()?).with_field("title", "Hello");
//! reindex.index_nodes(&[node.clone()], &Context::new())?;
//! assert!(backend.get(&node.node_ref, &Context::new()).is_some());
//! # Ok(())
//! # }
//! ```

mod backend;
mod environment;
mod error;
mod gated;
mod memory;
mod query;
mod types;

pub use crate::backend::SearchBackend;
pub use crate::environment::{Environment, ProcessEnvironment, StaticEnvironment};
pub use crate::error::{SearchError, SearchErrorExt};
pub use crate::gated::{
    DEFAULT_ENV_OVERRIDE, DEFAULT_FLAG_NAME, ExecutionContext, GatedSearchFacade,
    GatedSearchFacadeBuilder, GatingConfig, NoBackend, NoFlags, WithBackend, WithFlags,
};
pub use crate::memory::{DEFAULT_TENANT, MemorySearch};
pub use crate::query::{Occur, ParsedQuery, Term};
pub use crate::types::{
    Context, MAX_COUNT, Node, NodeRef, QName, SearchRequest, SearchResponse, TENANT_ID_KEY,
};
