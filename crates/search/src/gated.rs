//! Read-only gating for search writes.
//!
//! [`GatedSearchFacade`] wraps a [`SearchBackend`] and silently drops
//! `index_nodes`/`delete_nodes` while indexing is disabled. Everything else is
//! forwarded unconditionally. Whether indexing is disabled is decided once per
//! facade, on the first gated call, and never re-evaluated:
//!
//! | [`ExecutionContext`] | Source of the decision                                          |
//! |----------------------|-----------------------------------------------------------------|
//! | `Service`            | flag `ncr_search_indexing_disabled` (default `false`)           |
//! | `Administrative`     | env var `NCR_SEARCH_INDEXING_DISABLED` (unset means writable)   |
//!
//! Administrative tooling such as a reindex job ignores the flag so it can
//! run while normal traffic is read-only; only the explicit environment
//! override stops it.

use crate::backend::SearchBackend;
use crate::environment::{Environment, ProcessEnvironment};
use crate::query::ParsedQuery;
use crate::types::{Context, Node, NodeRef, QName, SearchRequest, SearchResponse};
use ncr_flags::{FlagError, FlagSource, parse_bool};
use private::Sealed;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, trace};

/// Flag consulted in [`ExecutionContext::Service`].
pub const DEFAULT_FLAG_NAME: &str = "ncr_search_indexing_disabled";
/// Environment variable consulted in [`ExecutionContext::Administrative`].
pub const DEFAULT_ENV_OVERRIDE: &str = "NCR_SEARCH_INDEXING_DISABLED";

/// How the hosting process was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Normal request/worker traffic.
    #[default]
    Service,
    /// Command-line or other operator tooling.
    Administrative,
}

/// Memoized write policy. Transitions only `Unknown -> ReadOnly | Writable`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GatingDecision {
    Unknown = 0,
    ReadOnly = 1,
    Writable = 2,
}

impl GatingDecision {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::ReadOnly,
            2 => Self::Writable,
            _ => Self::Unknown,
        }
    }

    const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Names of the flag and environment variable driving the decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatingConfig {
    pub flag_name: String,
    pub env_override: String,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            flag_name: DEFAULT_FLAG_NAME.to_owned(),
            env_override: DEFAULT_ENV_OVERRIDE.to_owned(),
        }
    }
}

/// A [`SearchBackend`] that suppresses writes while indexing is disabled.
///
/// While read-only, `index_nodes` and `delete_nodes` return `Ok(())` without
/// touching the wrapped backend. Suppression is deliberately silent: callers
/// see success and the facade does not expose its decision. A caller that
/// must know whether a write was dropped has to ask the flag source itself.
///
/// `create_storage`, `describe_storage` and `search_nodes` are always forwarded.
///
/// The decision is resolved on the first gated call and cached for the
/// lifetime of the facade, so a flag flipped afterwards is not observed.
/// Concurrent first calls agree on a single value. A failed flag lookup
/// leaves the decision unresolved and is retried on the next gated call.
///
/// Backend errors pass through unchanged; flag errors reach the caller
/// through the backend error's `From<FlagError>` conversion.
///
/// # Example
///
/// ```rust
/// use ncr_flags::Flagset;
/// use ncr_search::{Context, GatedSearchFacade, MemorySearch, Node, SearchBackend};
///
/// # fn main() -> Result<(), ncr_search::SearchError> {
/// let flags = Flagset::new();
/// flags.set("ncr_search_indexing_disabled", true)?;
///
/// let backend = MemorySearch::new();
/// let search = GatedSearchFacade::new(flags, backend.clone());
///
/// let node = Node::new("acme:article:1".parse()?);
/// search.index_nodes(&[node.clone()], &Context::new())?;
/// assert!(backend.get(&node.node_ref, &Context::new()).is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GatedSearchFacade<B> {
    backend: B,
    flags: Arc<dyn FlagSource>,
    environment: Arc<dyn Environment>,
    context: ExecutionContext,
    flag_name: Cow<'static, str>,
    env_override: Cow<'static, str>,
    decision: AtomicU8,
}

impl GatedSearchFacade<NoBackend> {
    #[must_use = "The facade is not created until you call .build()"]
    pub fn builder() -> GatedSearchFacadeBuilder {
        GatedSearchFacadeBuilder::new()
    }
}

impl<B: SearchBackend> GatedSearchFacade<B> {
    /// Wraps `backend` for [`ExecutionContext::Service`] with the default names.
    pub fn new(flags: impl FlagSource + 'static, backend: B) -> Self {
        GatedSearchFacadeBuilder::new().flags(flags).backend(backend).build()
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn execution_context(&self) -> ExecutionContext {
        self.context
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    fn decision(&self) -> Result<GatingDecision, FlagError> {
        let cached = GatingDecision::from_u8(self.decision.load(Ordering::Acquire));
        if cached != GatingDecision::Unknown {
            return Ok(cached);
        }

        let resolved = self.resolve()?;
        match self.decision.compare_exchange(
            GatingDecision::Unknown as u8,
            resolved as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                debug!(
                    context = ?self.context,
                    read_only = resolved.is_read_only(),
                    "Search write gating resolved"
                );
                Ok(resolved)
            },
            Err(winner) => Ok(GatingDecision::from_u8(winner)),
        }
    }

    fn resolve(&self) -> Result<GatingDecision, FlagError> {
        let read_only = match self.context {
            ExecutionContext::Administrative => self
                .environment
                .var(&self.env_override)
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false),
            ExecutionContext::Service => self.flags.get_boolean(&self.flag_name, false)?,
        };

        Ok(if read_only { GatingDecision::ReadOnly } else { GatingDecision::Writable })
    }
}

impl<B> SearchBackend for GatedSearchFacade<B>
where
    B: SearchBackend,
    B::Error: From<FlagError>,
{
    type Error = B::Error;

    fn create_storage(&self, qname: &QName, context: &Context) -> Result<(), Self::Error> {
        self.backend.create_storage(qname, context)
    }

    fn describe_storage(&self, qname: &QName, context: &Context) -> Result<String, Self::Error> {
        self.backend.describe_storage(qname, context)
    }

    fn index_nodes(&self, nodes: &[Node], context: &Context) -> Result<(), Self::Error> {
        if self.decision()?.is_read_only() {
            debug!(count = nodes.len(), "Indexing suppressed while search is read-only");
            return Ok(());
        }
        trace!(count = nodes.len(), "Forwarding index_nodes");
        self.backend.index_nodes(nodes, context)
    }

    fn delete_nodes(&self, node_refs: &[NodeRef], context: &Context) -> Result<(), Self::Error> {
        if self.decision()?.is_read_only() {
            debug!(count = node_refs.len(), "Deletion suppressed while search is read-only");
            return Ok(());
        }
        trace!(count = node_refs.len(), "Forwarding delete_nodes");
        self.backend.delete_nodes(node_refs, context)
    }

    fn search_nodes(
        &self,
        request: &SearchRequest,
        query: &ParsedQuery,
        response: &mut SearchResponse,
        qnames: &[QName],
        context: &Context,
    ) -> Result<(), Self::Error> {
        self.backend.search_nodes(request, query, response, qnames, context)
    }
}

#[derive(Debug)]
struct Settings {
    context: ExecutionContext,
    environment: Arc<dyn Environment>,
    flag_name: Cow<'static, str>,
    env_override: Cow<'static, str>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context: ExecutionContext::default(),
            environment: Arc::new(ProcessEnvironment),
            flag_name: Cow::Borrowed(DEFAULT_FLAG_NAME),
            env_override: Cow::Borrowed(DEFAULT_ENV_OVERRIDE),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoFlags;
#[derive(Debug)]
pub struct WithFlags(Arc<dyn FlagSource>);
#[derive(Debug, Default)]
pub struct NoBackend;
#[derive(Debug)]
pub struct WithBackend<B>(B);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoFlags {}
impl Sealed for WithFlags {}
impl Sealed for NoBackend {}
impl<B> Sealed for WithBackend<B> {}

/// Builder for [`GatedSearchFacade`]; the flag source and the backend are
/// required before [`GatedSearchFacadeBuilder::build`] becomes available.
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct GatedSearchFacadeBuilder<F: Sealed = NoFlags, B: Sealed = NoBackend> {
    flags: F,
    backend: B,
    settings: Settings,
}

impl GatedSearchFacadeBuilder {
    #[must_use = "The facade is not created until you call .build()"]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(private_bounds)]
impl<F: Sealed, B: Sealed> GatedSearchFacadeBuilder<F, B> {
    #[must_use = "Sets how the hosting process was invoked"]
    pub const fn context(mut self, context: ExecutionContext) -> Self {
        self.settings.context = context;
        self
    }

    #[must_use = "Sets where the administrative override is read from"]
    pub fn environment(mut self, environment: impl Environment + 'static) -> Self {
        self.settings.environment = Arc::new(environment);
        self
    }

    #[must_use = "Sets the flag consulted in the service context"]
    pub fn flag_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.settings.flag_name = name.into();
        self
    }

    #[must_use = "Sets the environment variable consulted in the administrative context"]
    pub fn env_override(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.settings.env_override = name.into();
        self
    }

    #[must_use = "Applies both names from a loaded configuration"]
    pub fn config(self, config: &GatingConfig) -> Self {
        self.flag_name(config.flag_name.clone()).env_override(config.env_override.clone())
    }
}

#[allow(private_bounds)]
impl<B: Sealed> GatedSearchFacadeBuilder<NoFlags, B> {
    #[must_use = "Sets the flag source consulted in the service context"]
    pub fn flags(self, flags: impl FlagSource + 'static) -> GatedSearchFacadeBuilder<WithFlags, B> {
        GatedSearchFacadeBuilder {
            flags: WithFlags(Arc::new(flags)),
            backend: self.backend,
            settings: self.settings,
        }
    }
}

#[allow(private_bounds)]
impl<F: Sealed> GatedSearchFacadeBuilder<F, NoBackend> {
    #[must_use = "Sets the backend that receives forwarded calls"]
    pub fn backend<B: SearchBackend>(self, backend: B) -> GatedSearchFacadeBuilder<F, WithBackend<B>> {
        GatedSearchFacadeBuilder {
            flags: self.flags,
            backend: WithBackend(backend),
            settings: self.settings,
        }
    }
}

impl<B: SearchBackend> GatedSearchFacadeBuilder<WithFlags, WithBackend<B>> {
    #[must_use]
    pub fn build(self) -> GatedSearchFacade<B> {
        let Settings { context, environment, flag_name, env_override } = self.settings;
        GatedSearchFacade {
            backend: self.backend.0,
            flags: self.flags.0,
            environment,
            context,
            flag_name,
            env_override,
            decision: AtomicU8::new(GatingDecision::Unknown as u8),
        }
    }
}
