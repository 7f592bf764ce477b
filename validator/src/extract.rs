//! Typed access to validated facets
//!
//! `ValidParams<T>`, `ValidQuery<T>` and `ValidBody<T>` read the normalized
//! values left by [`validate_request`](crate::validate_request) and
//! deserialize them into `T`.
//!
//! ```ignore
//! pub async fn create_review(
//!     ValidParams(path): ValidParams<ContractPath>,
//!     ValidBody(review): ValidBody<CreateReview>,
//! ) -> impl IntoResponse {
//!     // both are already sanitized and validated
//! }
//! ```
//!
//! A failure here means the route is wired wrong (no middleware, or a type
//! that does not match its schema), so the rejection is a 500.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::facet::Facet;
use crate::middleware::NormalizedFacets;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0} was not validated for this route")]
    NotValidated(Facet),

    #[error("validated {facet} does not match the handler's type: {source}")]
    TypeMismatch {
        facet: Facet,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct ExtractErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "validated extractor misconfigured");

        let body = ExtractErrorBody {
            error: "InternalServerError",
            message: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn normalized<T: DeserializeOwned>(parts: &Parts, facet: Facet) -> Result<T, ExtractError> {
    let value = parts
        .extensions
        .get::<NormalizedFacets>()
        .and_then(|facets| facets.get(facet))
        .ok_or(ExtractError::NotValidated(facet))?;

    T::deserialize(value).map_err(|source| ExtractError::TypeMismatch { facet, source })
}

macro_rules! validated_extractor {
    ($(#[$meta:meta])* $name:ident, $facet:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<T>(pub T);

        #[async_trait]
        impl<S, T> FromRequestParts<S> for $name<T>
        where
            T: DeserializeOwned + Send,
            S: Send + Sync,
        {
            type Rejection = ExtractError;

            async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
                normalized(parts, $facet).map($name)
            }
        }

        impl<T> std::ops::Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> std::ops::DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

validated_extractor!(
    /// Normalized path parameters.
    ValidParams,
    Facet::Params
);
validated_extractor!(
    /// Normalized query string.
    ValidQuery,
    Facet::Query
);
validated_extractor!(
    /// Normalized JSON body.
    ValidBody,
    Facet::Body
);
