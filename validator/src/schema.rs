//! Schema capability
//!
//! A [`Schema`] turns a raw facet value into its normalized form or explains
//! why it cannot. The validator treats it as opaque; this module also ships
//! two engines:
//!
//! 1. [`TypedSchema`] - deserializes into a Rust type, runs its
//!    [`Validatable`] rules, and serializes it back. Fields the type does not
//!    declare are dropped.
//! 2. [`SchemaFn`] - wraps a closure.

use std::{fmt, marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the offending field inside the facet. Empty for the facet root.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Structured error produced by a schema.
///
/// Passed through to the rejection body unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("schema rejected input with {} issue(s)", .issues.len())]
pub struct SchemaError {
    pub issues: Vec<FieldError>,
}

impl SchemaError {
    pub fn new(issues: Vec<FieldError>) -> Self {
        Self { issues }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldError::new(field, message)],
        }
    }
}

impl From<Vec<FieldError>> for SchemaError {
    fn from(issues: Vec<FieldError>) -> Self {
        Self::new(issues)
    }
}

/// Validation and normalization capability bound to one facet.
pub trait Schema: Send + Sync + 'static {
    /// Returns the normalized value, which may differ in shape from `input`.
    fn validate(&self, input: &Value) -> Result<Value, SchemaError>;
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn validate(&self, input: &Value) -> Result<Value, SchemaError> {
        (**self).validate(input)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn validate(&self, input: &Value) -> Result<Value, SchemaError> {
        (**self).validate(input)
    }
}

/// Trait for types that can be validated and sanitized
///
/// Implement this for a request type to use it with [`TypedSchema`].
pub trait Validatable {
    /// Sanitize the data in-place (trim whitespace, strip HTML, etc.)
    fn sanitize(&mut self) {}

    /// Validate the data and return any field errors
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

/// Schema backed by a serde type.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct CreateReview { rating: u8, comment: String }
///
/// impl Validatable for CreateReview {
///     fn validate(&self) -> Result<(), Vec<FieldError>> {
///         let mut builder = ValidationBuilder::new();
///         builder.check_condition(self.rating > 5, "rating", "must be at most 5");
///         builder.build()
///     }
/// }
///
/// let schema = TypedSchema::<CreateReview>::new();
/// ```
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedSchema<{}>", std::any::type_name::<T>())
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + Serialize + Validatable + 'static,
{
    fn validate(&self, input: &Value) -> Result<Value, SchemaError> {
        let mut data = T::deserialize(input).map_err(|e| SchemaError::single("", e.to_string()))?;

        data.sanitize();
        data.validate().map_err(SchemaError::new)?;

        serde_json::to_value(&data).map_err(|e| SchemaError::single("", e.to_string()))
    }
}

/// Schema backed by a closure.
#[derive(Clone)]
pub struct SchemaFn<F>(F);

/// Wrap `f` as a [`Schema`].
pub fn schema_fn<F>(f: F) -> SchemaFn<F>
where
    F: Fn(&Value) -> Result<Value, SchemaError> + Send + Sync + 'static,
{
    SchemaFn(f)
}

impl<F> Schema for SchemaFn<F>
where
    F: Fn(&Value) -> Result<Value, SchemaError> + Send + Sync + 'static,
{
    fn validate(&self, input: &Value) -> Result<Value, SchemaError> {
        (self.0)(input)
    }
}

impl<F> fmt::Debug for SchemaFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SchemaFn")
    }
}

/// Builder for accumulating validation errors
#[derive(Debug, Default)]
pub struct ValidationBuilder {
    errors: Vec<FieldError>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Add an error if the result is Err
    pub fn check<F>(&mut self, field: &str, validator: F) -> &mut Self
    where
        F: FnOnce() -> Result<(), String>,
    {
        if let Err(message) = validator() {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Add an error directly
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Add error if condition is true
    pub fn check_condition(
        &mut self,
        condition: bool,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        if condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn build(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
