use std::sync::Arc;

use crate::{
    normalizer::{walk::Walker, Normalizer},
    resolver::{Resolver, DEFAULT_MAX_REFERENCE_DEPTH},
    storage::SchemaStorage,
    validator::{JsonSchemaValidator, Validator},
    Error, Json,
};

/// Configuration options for [`SchemaNormalizer`].
#[derive(Clone)]
pub struct NormalizerOptions {
    max_reference_depth: usize,
    validator: Option<Arc<dyn Validator>>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        NormalizerOptions::new()
    }
}

impl std::fmt::Debug for NormalizerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizerOptions")
            .field("max_reference_depth", &self.max_reference_depth)
            .field("custom_validator", &self.validator.is_some())
            .finish()
    }
}

impl NormalizerOptions {
    #[must_use]
    pub fn new() -> NormalizerOptions {
        NormalizerOptions {
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            validator: None,
        }
    }
    /// Limit the number of `$ref` hops followed while resolving a single schema node.
    ///
    /// Default: `64`.
    #[must_use]
    pub fn max_reference_depth(mut self, max_reference_depth: usize) -> NormalizerOptions {
        self.max_reference_depth = max_reference_depth;
        self
    }
    /// Use a custom validation oracle instead of [`JsonSchemaValidator`].
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> NormalizerOptions {
        self.validator = Some(Arc::new(validator));
        self
    }
    /// Create a normalizer for the schema at `schema_uri`.
    ///
    /// The schema is not loaded until the first call to [`Normalizer::normalize`].
    #[must_use]
    pub fn build(self, schema_uri: impl Into<String>, storage: SchemaStorage) -> SchemaNormalizer {
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(JsonSchemaValidator::new(storage.clone())));
        SchemaNormalizer {
            schema_uri: schema_uri.into(),
            storage,
            validator,
            max_reference_depth: self.max_reference_depth,
        }
    }
}

/// Reorders object keys as the schema declares them.
///
/// ```rust
/// use json_normalizer::{Json, Normalizer, SchemaNormalizer, SchemaStorage};
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = SchemaStorage::options()
///     .with_document(
///         "https://example.com/person.json",
///         json!({"properties": {"name": {}, "age": {}}}),
///     )
///     .build()?;
/// let normalizer = SchemaNormalizer::new("https://example.com/person.json", storage);
///
/// let json: Json = r#"{"nickname": "Bo", "age": 42, "name": "Bob"}"#.parse()?;
/// let normalized = normalizer.normalize(&json)?;
/// assert_eq!(normalized.encoded(), r#"{"name":"Bob","age":42,"nickname":"Bo"}"#);
/// # Ok(())
/// # }
/// ```
///
/// Properties declared by the schema come first, in declaration order, followed by all other
/// properties sorted by key. The document is validated before and after normalization, and
/// nothing is returned unless both validations pass.
pub struct SchemaNormalizer {
    schema_uri: String,
    storage: SchemaStorage,
    validator: Arc<dyn Validator>,
    max_reference_depth: usize,
}

impl std::fmt::Debug for SchemaNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaNormalizer")
            .field("schema_uri", &self.schema_uri)
            .field("storage", &self.storage)
            .field("max_reference_depth", &self.max_reference_depth)
            .finish_non_exhaustive()
    }
}

impl SchemaNormalizer {
    /// Normalizer with default options.
    #[must_use]
    pub fn new(schema_uri: impl Into<String>, storage: SchemaStorage) -> SchemaNormalizer {
        NormalizerOptions::new().build(schema_uri, storage)
    }
    /// Configuration options for creating a [`SchemaNormalizer`].
    #[must_use]
    pub fn options() -> NormalizerOptions {
        NormalizerOptions::new()
    }
    #[must_use]
    pub fn schema_uri(&self) -> &str {
        &self.schema_uri
    }
    #[must_use]
    pub fn storage(&self) -> &SchemaStorage {
        &self.storage
    }
}

impl Normalizer for SchemaNormalizer {
    /// # Errors
    ///
    /// - any of the schema URI errors of [`SchemaStorage::get_schema`];
    /// - [`Error::OriginalInvalidAccordingToSchema`] if `json` does not conform to the schema;
    /// - [`Error::NormalizedInvalidAccordingToSchema`] if the reordered document does not;
    /// - [`Error::InvalidSchema`] or [`Error::ReferenceDepthExceeded`] for unusable schemas.
    fn normalize(&self, json: &Json) -> Result<Json, Error> {
        let span = tracing::debug_span!("normalize", schema_uri = %self.schema_uri);
        let _entered = span.enter();

        let schema = self.storage.get_schema(&self.schema_uri)?;
        let outcome = self.validator.validate(json.decoded(), &schema)?;
        if !outcome.is_valid() {
            tracing::debug!(errors = outcome.errors().len(), "Original document is invalid");
            return Err(Error::OriginalInvalidAccordingToSchema {
                schema_uri: self.schema_uri.clone(),
                errors: outcome.into_messages(),
            });
        }

        let resolver = Resolver::new(&self.storage, &*self.validator)
            .with_max_reference_depth(self.max_reference_depth);
        let normalized = Walker::new(resolver).normalize(json.decoded(), &schema)?;

        let outcome = self.validator.validate(&normalized, &schema)?;
        if !outcome.is_valid() {
            tracing::debug!(errors = outcome.errors().len(), "Normalized document is invalid");
            return Err(Error::NormalizedInvalidAccordingToSchema {
                schema_uri: self.schema_uri.clone(),
                errors: outcome.into_messages(),
            });
        }
        tracing::debug!("Normalized document");
        Ok(Json::from_value(normalized))
    }
}
