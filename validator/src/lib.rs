//! Request validation for axum handlers
//!
//! Validates and normalizes the three facets of a request (path params, query
//! string, body) before the handler runs, and answers with a fixed 400 shape
//! when any of them is invalid.
//!
//! # Overview
//!
//! 1. **Schemas** - [`Schema`] capability, with [`TypedSchema`] and [`schema_fn`]
//! 2. **Validator** - [`RequestValidator`] runs the schemas in Params, Query,
//!    Body order and collects every failure
//! 3. **Rejection** - [`send_errors`] / [`send_error`] build the 400 response
//! 4. **Middleware** - [`validate_request`] wires it all into an axum router
//! 5. **Extractors** - [`ValidParams`], [`ValidQuery`], [`ValidBody`]
//!
//! # Usage
//!
//! ```ignore
//! use request_validator::{validate_request, RequestSchemas, RequestValidator, TypedSchema, ValidBody};
//!
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
//! # Rejection body
//!
//! ```json
//! [
//!   { "type": "Params", "errors": { "issues": [{ "field": "", "message": "invalid type: ..." }] } },
//!   { "type": "Body",   "errors": { "issues": [{ "field": "rating", "message": "must be at most 5" }] } }
//! ]
//! ```
//!
//! Facets are not short-circuited: a facet that passes is normalized even
//! when another facet makes the request fail.

pub mod config;
pub mod extract;
pub mod facet;
pub mod middleware;
pub mod rejection;
pub mod schema;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use extract::{ExtractError, ValidBody, ValidParams, ValidQuery};
pub use facet::{Facet, RequestFacets};
pub use middleware::{validate_request, NormalizedFacets};
pub use rejection::{send_error, send_errors, ValidationFailure, ValidationRejection};
pub use schema::{
    schema_fn, FieldError, Schema, SchemaError, SchemaFn, TypedSchema, Validatable,
    ValidationBuilder,
};
pub use validator::{RequestSchemas, RequestValidator};
