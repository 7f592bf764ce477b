//! axum middleware adapter
//!
//! Reads the configured facets out of the incoming request, runs the
//! [`RequestValidator`], and either forwards the request with its facets
//! normalized or answers with the 400 rejection.
//!
//! ```ignore
//! let validator = RequestValidator::new(
//!     RequestSchemas::new()
//!         .params(TypedSchema::<ContractPath>::new())
//!         .body(TypedSchema::<CreateReview>::new()),
//! );
//!
//! let app = Router::new()
//!     .route("/contracts/:id/reviews", post(create_review))
//!     .route_layer(middleware::from_fn_with_state(validator, validate_request));
//! ```
//!
//! Use `route_layer` rather than `layer`: path parameters are only known once a
//! route has matched.
//!
//! After a successful run:
//! - the body is replaced by the normalized JSON (`Transfer-Encoding` is
//!   dropped in favour of a fresh `Content-Length`),
//! - the URI query string is re-encoded from the normalized query,
//! - [`NormalizedFacets`] is inserted into the request extensions.
//!
//! The router's own path parameters cannot be rewritten; read the normalized
//! params through [`ValidParams`](crate::ValidParams).

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    extract::{
        rejection::RawPathParamsRejection, FromRequestParts, Query, RawPathParams, Request,
        State,
    },
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING},
        request::Parts,
        uri::PathAndQuery,
        HeaderValue, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::facet::{Facet, RequestFacets};
use crate::rejection::ValidationFailure;
use crate::schema::SchemaError;
use crate::validator::RequestValidator;

/// Normalized facet values, stored in the request extensions by
/// [`validate_request`]. Only facets with a schema are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFacets {
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

impl NormalizedFacets {
    pub fn get(&self, facet: Facet) -> Option<&Value> {
        match facet {
            Facet::Params => self.params.as_ref(),
            Facet::Query => self.query.as_ref(),
            Facet::Body => self.body.as_ref(),
        }
    }
}

pub async fn validate_request(
    State(validator): State<RequestValidator>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let mut facets = RequestFacets::new();
    let mut undecodable = Vec::new();

    if validator.is_configured(Facet::Params) {
        match read_params(&mut parts).await {
            Ok(params) => facets.params = params,
            Err(errors) => undecodable.push(ValidationFailure::new(Facet::Params, errors)),
        }
    }

    if validator.is_configured(Facet::Query) {
        match read_query(&parts.uri) {
            Ok(query) => facets.query = query,
            Err(errors) => undecodable.push(ValidationFailure::new(Facet::Query, errors)),
        }
    }

    let untouched_body = if validator.is_configured(Facet::Body) {
        match read_body(&parts, body, validator.config().body_limit).await {
            Ok(value) => facets.body = value,
            Err(errors) => undecodable.push(ValidationFailure::new(Facet::Body, errors)),
        }
        None
    } else {
        Some(body)
    };

    if let Err(rejection) = validator.validate_decoded(&mut facets, undecodable) {
        tracing::debug!(
            method = %parts.method,
            uri = %parts.uri,
            failures = rejection.failures().len(),
            "validation failed"
        );
        return rejection.into_response();
    }

    let RequestFacets {
        params,
        query,
        body: body_value,
    } = facets;

    let mut normalized = NormalizedFacets::default();

    if validator.is_configured(Facet::Params) {
        normalized.params = Some(params);
    }

    if validator.is_configured(Facet::Query) {
        rewrite_query(&mut parts, &query);
        normalized.query = Some(query);
    }

    let body = match untouched_body {
        Some(body) => body,
        None => {
            let bytes = match serde_json::to_vec(&body_value) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!(error = %err, "failed to re-encode normalized body");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            parts.headers.remove(TRANSFER_ENCODING);
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
            if !parts.headers.contains_key(CONTENT_TYPE) {
                parts
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            normalized.body = Some(body_value);
            Body::from(bytes)
        }
    };

    parts.extensions.insert(normalized);

    next.run(Request::from_parts(parts, body)).await
}

/// A route without captures yields an empty object. Captures that cannot be
/// percent-decoded are a Params failure.
async fn read_params(parts: &mut Parts) -> Result<Value, SchemaError> {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => Ok(Value::Object(
            params
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect(),
        )),
        Err(RawPathParamsRejection::MissingPathParams(_)) => {
            tracing::debug!("no path params available");
            Ok(Value::Object(Map::new()))
        }
        Err(rejection) => Err(SchemaError::single("", rejection.body_text())),
    }
}

fn read_query(uri: &Uri) -> Result<Value, SchemaError> {
    let Query(pairs) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|rejection| SchemaError::single("", rejection.body_text()))?;

    Ok(Value::Object(
        pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    ))
}

async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Value, SchemaError> {
    let bytes = to_bytes(body, limit).await.map_err(|_| {
        SchemaError::single(
            "",
            format!("Failed to read request body (limit is {limit} bytes)"),
        )
    })?;

    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .is_some_and(is_json_content_type);
    if !is_json {
        return Err(SchemaError::single(
            "",
            "Content-Type must be application/json",
        ));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| SchemaError::single("", format!("Invalid JSON: {e}")))
}

fn is_json_content_type(value: &HeaderValue) -> bool {
    let Ok(raw) = value.to_str() else {
        return false;
    };
    let essence = raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn rewrite_query(parts: &mut Parts, query: &Value) {
    let Some(encoded) = encode_query(query) else {
        tracing::debug!("normalized query has nested values; URI left unchanged");
        return;
    };

    match replace_query(&parts.uri, &encoded) {
        Some(uri) => parts.uri = uri,
        None => tracing::warn!(query = %encoded, "could not rebuild URI with normalized query"),
    }
}

/// Encodes an object of scalars (or arrays of scalars) as a query string.
/// `null` entries are skipped. Returns `None` for anything nested deeper.
fn encode_query(query: &Value) -> Option<String> {
    let Value::Object(map) = query else {
        return None;
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        let key = urlencoding::encode(key);
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push(format!("{key}={}", urlencoding::encode(&scalar(item)?)));
                }
            }
            other => pairs.push(format!("{key}={}", urlencoding::encode(&scalar(other)?))),
        }
    }

    Some(pairs.join("&"))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn replace_query(uri: &Uri, query: &str) -> Option<Uri> {
    let path_and_query = if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    };

    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(uri_parts).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type(&HeaderValue::from_static("application/json")));
        assert!(is_json_content_type(&HeaderValue::from_static(
            "application/json; charset=utf-8"
        )));
        assert!(is_json_content_type(&HeaderValue::from_static(
            "application/merge-patch+json"
        )));
        assert!(!is_json_content_type(&HeaderValue::from_static("text/plain")));
        assert!(!is_json_content_type(&HeaderValue::from_static(
            "application/x-www-form-urlencoded"
        )));
    }

    #[test]
    fn query_decodes_into_string_object() {
        let uri: Uri = "/contracts?network=testnet&page=2".parse().unwrap();
        assert_eq!(
            read_query(&uri).unwrap(),
            json!({ "network": "testnet", "page": "2" })
        );

        let bare: Uri = "/contracts".parse().unwrap();
        assert_eq!(read_query(&bare).unwrap(), json!({}));
    }

    #[test]
    fn encode_query_handles_scalars_arrays_and_nulls() {
        let encoded = encode_query(&json!({
            "q": "a b&c",
            "page": 2,
            "verified": true,
            "tag": ["defi", "nft"],
            "cursor": null
        }))
        .unwrap();

        assert_eq!(encoded, "page=2&q=a%20b%26c&tag=defi&tag=nft&verified=true");
    }

    #[test]
    fn encode_query_refuses_nested_objects() {
        assert!(encode_query(&json!({ "filter": { "a": 1 } })).is_none());
        assert!(encode_query(&json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn replace_query_keeps_path() {
        let uri: Uri = "/contracts/abc?junk=1&page=2".parse().unwrap();

        assert_eq!(
            replace_query(&uri, "page=2").unwrap().to_string(),
            "/contracts/abc?page=2"
        );
        assert_eq!(replace_query(&uri, "").unwrap().to_string(), "/contracts/abc");
    }
}
