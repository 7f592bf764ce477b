//! Request facets
//!
//! A request is validated along three independent sections: the route's path
//! parameters, the query string and the body. [`RequestFacets`] holds the
//! current value of each one as a JSON value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the three independently validated request sections.
///
/// Serializes to the literal names used in rejection bodies:
/// `"Params"`, `"Query"` and `"Body"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
    Params,
    Query,
    Body,
}

impl Facet {
    /// All facets in evaluation order.
    pub const ALL: [Facet; 3] = [Facet::Params, Facet::Query, Facet::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Params => "Params",
            Facet::Query => "Query",
            Facet::Body => "Body",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mutable view of a request that the validator works on.
///
/// Only [`RequestValidator`](crate::RequestValidator) overwrites these values,
/// and only for a facet whose schema accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFacets {
    pub params: Value,
    pub query: Value,
    pub body: Value,
}

impl Default for RequestFacets {
    fn default() -> Self {
        Self {
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            body: Value::Object(Map::new()),
        }
    }
}

impl RequestFacets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn get(&self, facet: Facet) -> &Value {
        match facet {
            Facet::Params => &self.params,
            Facet::Query => &self.query,
            Facet::Body => &self.body,
        }
    }

    pub fn get_mut(&mut self, facet: Facet) -> &mut Value {
        match facet {
            Facet::Params => &mut self.params,
            Facet::Query => &mut self.query,
            Facet::Body => &mut self.body,
        }
    }
}
