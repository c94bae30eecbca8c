//! Minimal query language shared by callers and backends.
//!
//! ```text
//! breaking "climate change" +status:published -tags:draft
//! ```
//!
//! * bare words and `"quoted phrases"` are optional terms,
//! * a `+` prefix makes a term required, `-` makes it prohibited,
//! * `field:value` (or `field:"a phrase"`) restricts a term to one field.

use crate::types::Node;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Should,
    Must,
    MustNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub occur: Occur,
    pub field: Option<String>,
    pub text: String,
}

impl Term {
    /// Case-insensitive substring match against the named field, or any
    /// field when the term is unscoped.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        let needle = self.text.to_lowercase();
        match &self.field {
            Some(field) => node.fields.get(field).is_some_and(|v| contains(v, &needle)),
            None => node.fields.values().any(|v| contains(v, &needle)),
        }
    }
}

fn contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains(v, needle)),
        Value::Object(map) => map.values().any(|v| contains(v, needle)),
        Value::Bool(_) | Value::Number(_) => value.to_string().contains(needle),
    }
}

/// A query string broken into [`Term`]s. An empty query matches every node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    terms: Vec<Term>,
}

impl ParsedQuery {
    /// Parses `input`. Parsing never fails: an unterminated quote runs to the
    /// end of the input and empty terms (a lone `+`, `""`) are dropped.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut terms = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }

            let occur = match chars[i] {
                '+' => Occur::Must,
                '-' => Occur::MustNot,
                _ => Occur::Should,
            };
            if occur != Occur::Should {
                i += 1;
            }

            let start = i;
            while i < chars.len() && is_field_char(chars[i]) {
                i += 1;
            }
            let field = if i > start && chars.get(i) == Some(&':') {
                let name: String = chars[start..i].iter().collect();
                i += 1;
                Some(name)
            } else {
                i = start;
                None
            };

            let text: String = if chars.get(i) == Some(&'"') {
                let begin = i + 1;
                i = begin;
                while i < chars.len() && chars[i] != '"' {
                    i += 1;
                }
                let phrase = chars[begin..i].iter().collect();
                i = (i + 1).min(chars.len());
                phrase
            } else {
                let begin = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[begin..i].iter().collect()
            };

            let text = text.trim();
            if !text.is_empty() {
                terms.push(Term { occur, field, text: text.to_owned() });
            }
        }

        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All required terms match, no prohibited term matches, and at least one
    /// optional term matches when there are any.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        let mut has_optional = false;
        let mut optional_hit = false;

        for term in &self.terms {
            match term.occur {
                Occur::Must if !term.matches(node) => return false,
                Occur::MustNot if term.matches(node) => return false,
                Occur::Should => {
                    has_optional = true;
                    optional_hit = optional_hit || term.matches(node);
                },
                Occur::Must | Occur::MustNot => {},
            }
        }

        !has_optional || optional_hit
    }
}

const fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, term) in self.terms.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            match term.occur {
                Occur::Must => f.write_str("+")?,
                Occur::MustNot => f.write_str("-")?,
                Occur::Should => {},
            }
            if let Some(field) = &term.field {
                write!(f, "{field}:")?;
            }
            if term.text.contains(char::is_whitespace) {
                write!(f, "\"{}\"", term.text)?;
            } else {
                f.write_str(&term.text)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRef;

    fn term(occur: Occur, field: Option<&str>, text: &str) -> Term {
        Term { occur, field: field.map(str::to_owned), text: text.to_owned() }
    }

    fn article() -> Node {
        Node::new("acme:article:1".parse::<NodeRef>().unwrap())
            .with_field("title", "Climate Change Explained")
            .with_field("status", "published")
            .with_field("tags", serde_json::json!(["science", "weather"]))
            .with_field("views", 1200)
    }

    #[test]
    fn parses_prefixes_fields_and_phrases() {
        let query = ParsedQuery::parse(r#"breaking "climate change" +status:published -tags:draft"#);
        assert_eq!(
            query.terms(),
            &[
                term(Occur::Should, None, "breaking"),
                term(Occur::Should, None, "climate change"),
                term(Occur::Must, Some("status"), "published"),
                term(Occur::MustNot, Some("tags"), "draft"),
            ]
        );
    }

    #[test]
    fn tolerates_malformed_input() {
        assert!(ParsedQuery::parse("   ").is_empty());
        assert!(ParsedQuery::parse(r#"+ - """#).is_empty());
        assert_eq!(
            ParsedQuery::parse(r#"title:"unterminated phrase"#).terms(),
            &[term(Occur::Should, Some("title"), "unterminated phrase")]
        );
        assert_eq!(
            ParsedQuery::parse("url:http://x").terms(),
            &[term(Occur::Should, Some("url"), "http://x")]
        );
    }

    #[test]
    fn display_is_canonical() {
        let query = ParsedQuery::parse(r#"  -tags:draft   "two words"  +x "#);
        assert_eq!(query.to_string(), r#"-tags:draft "two words" +x"#);
    }

    #[test]
    fn matching_semantics() {
        let node = article();
        assert!(ParsedQuery::parse("").matches(&node));
        assert!(ParsedQuery::parse("climate").matches(&node));
        assert!(ParsedQuery::parse("CLIMATE").matches(&node), "case-insensitive");
        assert!(ParsedQuery::parse("tags:weather").matches(&node), "arrays are searched");
        assert!(ParsedQuery::parse("views:1200").matches(&node), "numbers render as text");
        assert!(ParsedQuery::parse("nothing climate").matches(&node), "one optional hit is enough");
        assert!(!ParsedQuery::parse("nothing").matches(&node));
        assert!(!ParsedQuery::parse("climate -status:published").matches(&node));
        assert!(!ParsedQuery::parse("+status:draft climate").matches(&node));
        assert!(ParsedQuery::parse("+status:published").matches(&node), "only required terms");
        assert!(!ParsedQuery::parse("missing_field:x").matches(&node));
    }
}
