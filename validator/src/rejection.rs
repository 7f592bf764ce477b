//! Rejection responses
//!
//! Every failed validation ends here: status 400 and a body listing one
//! `{ "type": <facet>, "errors": <schema error> }` entry per failing facet.

use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::facet::Facet;
use crate::schema::SchemaError;

const HEADER_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// A facet whose schema rejected its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    #[serde(rename = "type")]
    pub facet: Facet,
    pub errors: SchemaError,
}

impl ValidationFailure {
    pub fn new(facet: Facet, errors: SchemaError) -> Self {
        Self { facet, errors }
    }
}

/// Non-empty list of failures, in Params, Query, Body order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRejection {
    failures: Vec<ValidationFailure>,
}

impl ValidationRejection {
    /// Returns `None` when there is nothing to reject.
    pub fn from_failures(failures: Vec<ValidationFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn single(failure: ValidationFailure) -> Self {
        Self {
            failures: vec![failure],
        }
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.failures.iter().map(|f| f.facet)
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        send_errors(&self.failures)
    }
}

/// Respond with 400 and the list of failures, preserving their order.
pub fn send_errors(failures: &[ValidationFailure]) -> Response {
    debug_assert!(!failures.is_empty(), "rejection without failures");
    reject(Json(failures).into_response(), failures)
}

/// Respond with 400 and a single failure object (not wrapped in a list).
pub fn send_error(failure: &ValidationFailure) -> Response {
    reject(Json(failure).into_response(), std::slice::from_ref(failure))
}

fn reject(mut response: Response, failures: &[ValidationFailure]) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    tracing::debug!(
        correlation_id = %correlation_id,
        facets = ?failures.iter().map(|f| f.facet.as_str()).collect::<Vec<_>>(),
        "request rejected by validation"
    );

    *response.status_mut() = StatusCode::BAD_REQUEST;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(HEADER_CORRELATION_ID, value);
    }
    response
}
