//! Request validator
//!
//! Runs the configured schema of each facet in Params, Query, Body order and
//! collects every failure before deciding.

use std::{fmt, sync::Arc};

use crate::config::ValidatorConfig;
use crate::facet::{Facet, RequestFacets};
use crate::rejection::{ValidationFailure, ValidationRejection};
use crate::schema::Schema;

/// Schemas for up to three facets. A facet without a schema is never read.
#[derive(Clone, Default)]
pub struct RequestSchemas {
    pub params: Option<Arc<dyn Schema>>,
    pub query: Option<Arc<dyn Schema>>,
    pub body: Option<Arc<dyn Schema>>,
}

impl RequestSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, schema: impl Schema) -> Self {
        self.params = Some(Arc::new(schema));
        self
    }

    pub fn query(mut self, schema: impl Schema) -> Self {
        self.query = Some(Arc::new(schema));
        self
    }

    pub fn body(mut self, schema: impl Schema) -> Self {
        self.body = Some(Arc::new(schema));
        self
    }

    pub fn get(&self, facet: Facet) -> Option<&dyn Schema> {
        match facet {
            Facet::Params => self.params.as_deref(),
            Facet::Query => self.query.as_deref(),
            Facet::Body => self.body.as_deref(),
        }
    }
}

impl fmt::Debug for RequestSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSchemas")
            .field("params", &self.params.is_some())
            .field("query", &self.query.is_some())
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// Validates the facets of a request against their schemas.
///
/// Cheap to clone; share one per route as middleware state.
#[derive(Clone, Debug)]
pub struct RequestValidator {
    schemas: Arc<RequestSchemas>,
    config: ValidatorConfig,
}

impl RequestValidator {
    pub fn new(schemas: RequestSchemas) -> Self {
        Self {
            schemas: Arc::new(schemas),
            config: ValidatorConfig::default(),
        }
    }

    /// Validate only the route's path parameters.
    pub fn params(schema: impl Schema) -> Self {
        Self::new(RequestSchemas::new().params(schema))
    }

    /// Validate only the query string.
    pub fn query(schema: impl Schema) -> Self {
        Self::new(RequestSchemas::new().query(schema))
    }

    /// Validate only the body.
    pub fn body(schema: impl Schema) -> Self {
        Self::new(RequestSchemas::new().body(schema))
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn is_configured(&self, facet: Facet) -> bool {
        self.schemas.get(facet).is_some()
    }

    /// Facets that have a schema, in evaluation order.
    pub fn configured_facets(&self) -> impl Iterator<Item = Facet> + '_ {
        Facet::ALL.into_iter().filter(|f| self.is_configured(*f))
    }

    /// Validate `request` in place.
    ///
    /// Facets are not short-circuited. Every configured facet is checked even
    /// after an earlier one failed, and each facet that passes is overwritten
    /// with its normalized value *even when the overall result is a
    /// rejection*. A failing facet keeps its original value.
    pub fn validate(&self, request: &mut RequestFacets) -> Result<(), ValidationRejection> {
        self.validate_decoded(request, Vec::new())
    }

    /// Like [`validate`](Self::validate), with failures for facets that could
    /// not be decoded from the transport. Those facets skip their schema and
    /// keep their place in the evaluation order.
    pub(crate) fn validate_decoded(
        &self,
        request: &mut RequestFacets,
        mut undecodable: Vec<ValidationFailure>,
    ) -> Result<(), ValidationRejection> {
        let mut failures = Vec::new();

        for facet in Facet::ALL {
            let Some(schema) = self.schemas.get(facet) else {
                continue;
            };

            if let Some(pos) = undecodable.iter().position(|f| f.facet == facet) {
                failures.push(undecodable.swap_remove(pos));
                continue;
            }

            match schema.validate(request.get(facet)) {
                Ok(normalized) => *request.get_mut(facet) = normalized,
                Err(errors) => {
                    tracing::debug!(
                        facet = %facet,
                        issues = errors.issues.len(),
                        "facet failed validation"
                    );
                    failures.push(ValidationFailure::new(facet, errors));
                }
            }
        }

        match ValidationRejection::from_failures(failures) {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }
}
