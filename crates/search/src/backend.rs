use crate::query::ParsedQuery;
use crate::types::{Context, Node, NodeRef, QName, SearchRequest, SearchResponse};
use std::sync::Arc;

/// The search/indexing capability: storage provisioning, node indexing and
/// deletion, and query execution against an index.
///
/// Implementations choose their own error type so wrappers can pass failures
/// through untouched. Callers that only need one backend type can hold a
/// `dyn SearchBackend<Error = SearchError>`.
pub trait SearchBackend: Send + Sync {
    type Error;

    /// Creates the storage (index, table, partition) for `qname`.
    ///
    /// # Errors
    /// Implementation specific.
    fn create_storage(&self, qname: &QName, context: &Context) -> Result<(), Self::Error>;

    /// Returns a human-readable description of the storage for `qname`.
    ///
    /// # Errors
    /// Implementation specific.
    fn describe_storage(&self, qname: &QName, context: &Context) -> Result<String, Self::Error>;

    /// # Errors
    /// Implementation specific.
    fn index_nodes(&self, nodes: &[Node], context: &Context) -> Result<(), Self::Error>;

    /// # Errors
    /// Implementation specific.
    fn delete_nodes(&self, node_refs: &[NodeRef], context: &Context) -> Result<(), Self::Error>;

    /// Runs `query` over the storages of `qnames` and fills `response`.
    ///
    /// # Errors
    /// Implementation specific.
    fn search_nodes(
        &self,
        request: &SearchRequest,
        query: &ParsedQuery,
        response: &mut SearchResponse,
        qnames: &[QName],
        context: &Context,
    ) -> Result<(), Self::Error>;
}

macro_rules! forward_search_backend {
    ($($wrapper:ty),+ $(,)?) => {$(
        impl<T: SearchBackend + ?Sized> SearchBackend for $wrapper {
            type Error = T::Error;

            fn create_storage(&self, qname: &QName, context: &Context) -> Result<(), Self::Error> {
                (**self).create_storage(qname, context)
            }

            fn describe_storage(
                &self,
                qname: &QName,
                context: &Context,
            ) -> Result<String, Self::Error> {
                (**self).describe_storage(qname, context)
            }

            fn index_nodes(&self, nodes: &[Node], context: &Context) -> Result<(), Self::Error> {
                (**self).index_nodes(nodes, context)
            }

            fn delete_nodes(
                &self,
                node_refs: &[NodeRef],
                context: &Context,
            ) -> Result<(), Self::Error> {
                (**self).delete_nodes(node_refs, context)
            }

            fn search_nodes(
                &self,
                request: &SearchRequest,
                query: &ParsedQuery,
                response: &mut SearchResponse,
                qnames: &[QName],
                context: &Context,
            ) -> Result<(), Self::Error> {
                (**self).search_nodes(request, query, response, qnames, context)
            }
        }
    )+};
}

forward_search_backend!(&T, Arc<T>, Box<T>);
