//! SPARQL 1.1 JSON results model
//!
//! This module provides the typed wire shape of a SPARQL SELECT result:
//! - [`RdfTerm`] - one bound value (URI, literal or blank node)
//! - [`Binding`] - one result row, variable name to term
//! - [`QueryResult`] - the declared variables plus the ordered rows
//!
//! Query construction lives in [`query`], folding rows into typed records in
//! [`merge`].
//!
//! See <https://www.w3.org/TR/sparql11-results-json/>.

pub mod merge;
pub mod query;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use merge::{PersonInfo, PlaceInfo, TermMerger};
pub use query::QueryBuilder;

/// Kind of an RDF term as reported in the `type` member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    /// IRI reference
    Uri,

    /// Plain, language-tagged or typed literal
    // Virtuoso (DBpedia) still emits the SPARQL 1.0 "typed-literal" token
    #[serde(alias = "typed-literal")]
    Literal,

    /// Blank node
    Bnode,
}

/// One bound value in a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfTerm {
    /// Term kind
    #[serde(rename = "type")]
    pub kind: TermKind,

    /// Lexical value
    pub value: String,

    /// Language tag, literals only
    #[serde(
        default,
        rename = "xml:lang",
        skip_serializing_if = "Option::is_none"
    )]
    pub lang: Option<String>,

    /// Datatype IRI, literals only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl RdfTerm {
    /// Create a URI term
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    /// Create a plain literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: Some(lang.into()),
            datatype: None,
        }
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: None,
            datatype: Some(datatype.into()),
        }
    }

    /// Language tag as `&str`
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
}

/// One result row
pub type Binding = HashMap<String, RdfTerm>;

/// Result header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHead {
    /// Variables declared by the query, in projection order
    #[serde(default)]
    pub vars: Vec<String>,

    /// Optional links to metadata documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<String>>,
}

/// Result rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRows {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// A complete SELECT result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub head: ResultHead,

    #[serde(default)]
    pub results: ResultRows,
}

impl QueryResult {
    /// Build a result from variable names and rows
    pub fn new(vars: Vec<String>, bindings: Vec<Binding>) -> Self {
        Self {
            head: ResultHead { vars, link: None },
            results: ResultRows { bindings },
        }
    }

    /// Rows of the result
    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }

    /// Declared variable names
    pub fn vars(&self) -> &[String] {
        &self.head.vars
    }

    /// True when the result has no rows
    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }

    /// Parse the SPARQL JSON results document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
