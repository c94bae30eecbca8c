//! In-process search backend.
//!
//! Storage is partitioned by tenant (the `tenant_id` context entry, or
//! [`DEFAULT_TENANT`]) and [`QName`]. Each partition keeps nodes ordered by id,
//! so search results come back in node-ref order.

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::query::ParsedQuery;
use crate::types::{Context, Node, NodeRef, QName, SearchRequest, SearchResponse, TENANT_ID_KEY};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Tenant used when the context carries no `tenant_id`.
pub const DEFAULT_TENANT: &str = "default";

type Partition = BTreeMap<String, Node>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PartitionKey {
    tenant: String,
    qname: QName,
}

impl PartitionKey {
    fn new(qname: &QName, context: &Context) -> Self {
        Self { tenant: tenant_of(context).to_owned(), qname: qname.clone() }
    }
}

fn tenant_of(context: &Context) -> &str {
    context.get(TENANT_ID_KEY).map_or(DEFAULT_TENANT, String::as_str)
}

/// A thread-safe in-memory [`SearchBackend`].
///
/// Cloning is cheap; clones share the same index.
///
/// ```rust
/// use ncr_search::{Context, MemorySearch, Node, ParsedQuery, SearchBackend, SearchRequest, SearchResponse};
///
/// # fn main() -> Result<(), ncr_search::SearchError> {
/// let search = MemorySearch::new();
/// let ctx = Context::new();
/// let article = "acme:article".parse()?;
///
/// search.create_storage(&article, &ctx)?;
/// search.index_nodes(&[Node::new("acme:article:1".parse()?).with_field("title", "Hello")], &ctx)?;
///
/// let request = SearchRequest::new("hello");
/// let mut response = SearchResponse::default();
/// let query = ParsedQuery::parse(&request.query);
/// search.search_nodes(&request, &query, &mut response, &[article], &ctx)?;
/// assert_eq!(response.total, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySearch {
    partitions: Arc<RwLock<FxHashMap<PartitionKey, Partition>>>,
}

impl MemorySearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a single indexed node.
    #[must_use]
    pub fn get(&self, node_ref: &NodeRef, context: &Context) -> Option<Node> {
        let key = PartitionKey::new(node_ref.qname(), context);
        self.partitions.read().get(&key).and_then(|p| p.get(node_ref.id())).cloned()
    }

    /// Number of nodes stored for `qname`, or `None` if the storage does not exist.
    #[must_use]
    pub fn count(&self, qname: &QName, context: &Context) -> Option<usize> {
        self.partitions.read().get(&PartitionKey::new(qname, context)).map(BTreeMap::len)
    }
}

impl SearchBackend for MemorySearch {
    type Error = SearchError;

    fn create_storage(&self, qname: &QName, context: &Context) -> Result<(), SearchError> {
        let key = PartitionKey::new(qname, context);
        let mut partitions = self.partitions.write();
        if !partitions.contains_key(&key) {
            debug!(tenant = %key.tenant, %qname, "Created search storage");
            partitions.insert(key, Partition::new());
        }
        Ok(())
    }

    fn describe_storage(&self, qname: &QName, context: &Context) -> Result<String, SearchError> {
        let key = PartitionKey::new(qname, context);
        let partitions = self.partitions.read();
        let partition = partitions.get(&key).ok_or_else(|| SearchError::StorageNotFound {
            message: qname.to_string().into(),
            context: Some(format!("tenant `{}`", key.tenant).into()),
        })?;

        Ok(format!("memory://{}/{} ({} nodes)", key.tenant, qname, partition.len()))
    }

    fn index_nodes(&self, nodes: &[Node], context: &Context) -> Result<(), SearchError> {
        let mut partitions = self.partitions.write();
        for node in nodes {
            let key = PartitionKey::new(node.node_ref.qname(), context);
            partitions.entry(key).or_default().insert(node.node_ref.id().to_owned(), node.clone());
        }
        trace!(count = nodes.len(), tenant = tenant_of(context), "Indexed nodes");
        Ok(())
    }

    fn delete_nodes(&self, node_refs: &[NodeRef], context: &Context) -> Result<(), SearchError> {
        let mut partitions = self.partitions.write();
        for node_ref in node_refs {
            let key = PartitionKey::new(node_ref.qname(), context);
            if let Some(partition) = partitions.get_mut(&key) {
                partition.remove(node_ref.id());
            }
        }
        trace!(count = node_refs.len(), tenant = tenant_of(context), "Deleted nodes");
        Ok(())
    }

    /// Searches the partitions of `qnames`, or every partition of the tenant
    /// when `qnames` is empty. Storages that do not exist contribute no hits.
    fn search_nodes(
        &self,
        request: &SearchRequest,
        query: &ParsedQuery,
        response: &mut SearchResponse,
        qnames: &[QName],
        context: &Context,
    ) -> Result<(), SearchError> {
        request.validate()?;
        let tenant = tenant_of(context);

        let partitions = self.partitions.read();
        let mut hits: Vec<&Node> = partitions
            .iter()
            .filter(|(key, _)| {
                key.tenant == tenant && (qnames.is_empty() || qnames.contains(&key.qname))
            })
            .flat_map(|(_, partition)| partition.values())
            .filter(|node| query.matches(node))
            .collect();
        hits.sort_unstable_by(|a, b| a.node_ref.cmp(&b.node_ref));

        let offset = request.offset();
        response.total = hits.len();
        response.nodes = hits.into_iter().skip(offset).take(request.count as usize).cloned().collect();
        response.has_more = offset.saturating_add(response.nodes.len()) < response.total;

        trace!(%query, total = response.total, "Searched nodes");
        Ok(())
    }
}
