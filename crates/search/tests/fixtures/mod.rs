#![allow(dead_code, unreachable_pub)]

use ncr_flags::{FlagError, FlagSource, FlagValue};
use ncr_search::{
    Context, Node, NodeRef, ParsedQuery, QName, SearchBackend, SearchError, SearchRequest,
    SearchResponse,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sentinel written into responses so tests can see the backend filled them.
pub const SEARCH_TOTAL: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateStorage(QName, Context),
    DescribeStorage(QName, Context),
    IndexNodes(Vec<Node>, Context),
    DeleteNodes(Vec<NodeRef>, Context),
    SearchNodes { request: SearchRequest, query: String, qnames: Vec<QName>, context: Context },
}

impl Call {
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::IndexNodes(..) | Self::DeleteNodes(..))
    }
}

/// Backend that records every call and optionally fails all of them.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failure: Option<&'static str>,
}

impl RecordingBackend {
    pub fn failing(message: &'static str) -> Self {
        Self { calls: Mutex::default(), failure: Some(message) }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn writes(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_write()).count()
    }

    fn record(&self, call: Call) -> Result<(), SearchError> {
        self.calls.lock().push(call);
        self.failure.map_or(Ok(()), |message| Err(SearchError::from(message)))
    }
}

impl SearchBackend for RecordingBackend {
    type Error = SearchError;

    fn create_storage(&self, qname: &QName, context: &Context) -> Result<(), SearchError> {
        self.record(Call::CreateStorage(qname.clone(), context.clone()))
    }

    fn describe_storage(&self, qname: &QName, context: &Context) -> Result<String, SearchError> {
        self.record(Call::DescribeStorage(qname.clone(), context.clone()))?;
        Ok(format!("recorded {qname}"))
    }

    fn index_nodes(&self, nodes: &[Node], context: &Context) -> Result<(), SearchError> {
        self.record(Call::IndexNodes(nodes.to_vec(), context.clone()))
    }

    fn delete_nodes(&self, node_refs: &[NodeRef], context: &Context) -> Result<(), SearchError> {
        self.record(Call::DeleteNodes(node_refs.to_vec(), context.clone()))
    }

    fn search_nodes(
        &self,
        request: &SearchRequest,
        query: &ParsedQuery,
        response: &mut SearchResponse,
        qnames: &[QName],
        context: &Context,
    ) -> Result<(), SearchError> {
        self.record(Call::SearchNodes {
            request: request.clone(),
            query: query.to_string(),
            qnames: qnames.to_vec(),
            context: context.clone(),
        })?;
        response.total = SEARCH_TOTAL;
        Ok(())
    }
}

/// Flag source answering from a script, one value per lookup; the last
/// value repeats once the script is exhausted.
#[derive(Debug)]
pub struct ScriptedFlags {
    script: Vec<bool>,
    lookups: AtomicUsize,
}

impl ScriptedFlags {
    pub fn new(script: impl Into<Vec<bool>>) -> Self {
        Self { script: script.into(), lookups: AtomicUsize::new(0) }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl FlagSource for ScriptedFlags {
    fn get(&self, _name: &str) -> Result<Option<FlagValue>, FlagError> {
        let n = self.lookups.fetch_add(1, Ordering::SeqCst);
        let value = self.script.get(n).or_else(|| self.script.last()).copied();
        Ok(value.map(FlagValue::Bool))
    }
}

/// Flag source that is always down.
#[derive(Debug, Default)]
pub struct UnavailableFlags;

impl FlagSource for UnavailableFlags {
    fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError> {
        Err(FlagError::Unavailable { message: "flag store offline".into(), context: Some(name.to_owned().into()) })
    }
}

pub fn ctx() -> Context {
    Context::from([("tenant_id".to_owned(), "acme".to_owned())])
}

pub fn qname() -> QName {
    "acme:article".parse().expect("qname")
}

pub fn node(id: &str) -> Node {
    Node::new(format!("acme:article:{id}").parse().expect("node ref")).with_field("title", id)
}

pub fn node_ref(id: &str) -> NodeRef {
    format!("acme:article:{id}").parse().expect("node ref")
}
