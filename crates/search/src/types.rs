use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Context-map passed alongside every backend call.
pub type Context = BTreeMap<String, String>;

/// Context key selecting the tenant a call operates on.
pub const TENANT_ID_KEY: &str = "tenant_id";

/// Largest page size a [`SearchRequest`] may ask for.
pub const MAX_COUNT: u32 = 100;
const DEFAULT_COUNT: u32 = 25;

/// Qualified name of a node kind: `vendor:message`, e.g. `acme:article`.
///
/// Both segments are non-empty and limited to lowercase ASCII letters, digits
/// and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    vendor: String,
    message: String,
}

impl QName {
    /// # Errors
    /// Returns [`SearchError::InvalidQName`] if either segment is empty or
    /// contains characters outside `[a-z0-9-]`.
    pub fn new(vendor: impl Into<String>, message: impl Into<String>) -> Result<Self, SearchError> {
        let (vendor, message) = (vendor.into(), message.into());
        if !is_segment(&vendor) || !is_segment(&message) {
            return Err(SearchError::InvalidQName {
                message: format!("`{vendor}:{message}`").into(),
                context: None,
            });
        }
        Ok(Self { vendor, message })
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

impl FromStr for QName {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((vendor, message)) = s.split_once(':') else {
            return Err(SearchError::InvalidQName {
                message: format!("`{s}`").into(),
                context: Some("expected vendor:message".into()),
            });
        };
        Self::new(vendor, message)
    }
}

impl TryFrom<String> for QName {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.to_string()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor, self.message)
    }
}

/// Reference to a single node: `vendor:message:id`.
///
/// The id is everything after the second colon and may itself contain colons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeRef {
    qname: QName,
    id: String,
}

impl NodeRef {
    /// # Errors
    /// Returns [`SearchError::InvalidNodeRef`] if `id` is empty or contains whitespace.
    pub fn new(qname: QName, id: impl Into<String>) -> Result<Self, SearchError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(SearchError::InvalidNodeRef {
                message: format!("`{qname}:{id}`").into(),
                context: Some("id must be non-empty without whitespace".into()),
            });
        }
        Ok(Self { qname, id })
    }

    #[must_use]
    pub const fn qname(&self) -> &QName {
        &self.qname
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl FromStr for NodeRef {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(vendor), Some(message), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SearchError::InvalidNodeRef {
                message: format!("`{s}`").into(),
                context: Some("expected vendor:message:id".into()),
            });
        };
        Self::new(QName::new(vendor, message)?, id)
    }
}

impl TryFrom<String> for NodeRef {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeRef> for String {
    fn from(value: NodeRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.qname, self.id)
    }
}

/// A content entity that can be indexed or removed from a search backend.
///
/// Everything except the reference is an opaque JSON field map; it is
/// flattened next to `node_ref` on the wire:
///
/// ```json
/// { "node_ref": "acme:article:42", "title": "Hello", "status": "published" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_ref: NodeRef,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Node {
    #[must_use]
    pub fn new(node_ref: NodeRef) -> Self {
        Self { node_ref, fields: Map::new() }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Paging and raw query text of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Page size, `1..=MAX_COUNT`.
    pub count: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self { query: String::new(), page: 1, count: DEFAULT_COUNT }
    }
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// # Errors
    /// Returns [`SearchError::InvalidRequest`] if `page` is zero or `count` is
    /// outside `1..=MAX_COUNT`.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.page == 0 {
            return Err(SearchError::InvalidRequest {
                message: "page must be at least 1".into(),
                context: None,
            });
        }
        if self.count == 0 || self.count > MAX_COUNT {
            return Err(SearchError::InvalidRequest {
                message: format!("count must be within 1..={MAX_COUNT}, got {}", self.count).into(),
                context: None,
            });
        }
        Ok(())
    }

    /// Number of hits preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.count as usize)
    }
}

/// Output of a search, filled in place by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    pub nodes: Vec<Node>,
    /// Hits across all pages.
    pub total: usize,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn qname_validation() {
        let qname: QName = "acme:article".parse().unwrap();
        assert_eq!((qname.vendor(), qname.message()), ("acme", "article"));

        for bad in ["acme", ":article", "acme:", "Acme:article", "acme:art icle"] {
            assert!(bad.parse::<QName>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn node_ref_keeps_colons_in_id() {
        let node_ref: NodeRef = "acme:video:2024:intro".parse().unwrap();
        assert_eq!(node_ref.qname().to_string(), "acme:video");
        assert_eq!(node_ref.id(), "2024:intro");
        assert_eq!(node_ref.to_string(), "acme:video:2024:intro");

        assert!("acme:video".parse::<NodeRef>().is_err());
        assert!("acme:video:".parse::<NodeRef>().is_err());
    }

    #[test]
    fn node_flattens_fields() {
        let node: Node = serde_json::from_value(json!({
            "node_ref": "acme:article:1",
            "title": "Hello",
            "tags": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(node.node_ref.id(), "1");
        assert_eq!(node.fields.get("title"), Some(&json!("Hello")));
        assert!(!node.fields.contains_key("node_ref"));

        let bad = serde_json::from_value::<Node>(json!({ "node_ref": "nope" }));
        assert!(bad.is_err());
    }

    #[test]
    fn request_bounds() {
        assert!(SearchRequest::default().validate().is_ok());
        assert!(SearchRequest::new("x").with_page(0).validate().is_err());
        assert!(SearchRequest::new("x").with_count(0).validate().is_err());
        assert!(SearchRequest::new("x").with_count(MAX_COUNT + 1).validate().is_err());
        assert_eq!(SearchRequest::new("x").with_page(3).with_count(10).offset(), 20);
    }
}
