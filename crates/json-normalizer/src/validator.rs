//! The validation oracle.
//!
//! Normalization never interprets validation keywords itself. Whenever it needs to know whether a
//! value conforms to a (sub)schema, it asks a [`Validator`].
use std::sync::Arc;

use ahash::AHashMap;
use jsonschema::Draft;
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

use crate::{
    storage::{SchemaNode, SchemaStorage},
    Error, JsonValue,
};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pointer: String,
    message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> ValidationError {
        ValidationError {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
    /// JSON Pointer to the offending part of the instance.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The verdict of a [`Validator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn valid() -> ValidationOutcome {
        ValidationOutcome::default()
    }
    #[must_use]
    pub fn new(errors: Vec<ValidationError>) -> ValidationOutcome {
        ValidationOutcome { errors }
    }
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
    /// Error messages in the order the validator reported them.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(ValidationError::message)
    }
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.errors.into_iter().map(|error| error.message).collect()
    }
}

/// Decides whether a value conforms to a schema.
pub trait Validator: Send + Sync {
    /// Validate `instance` against `schema`.
    ///
    /// # Errors
    ///
    /// If the schema can not be used for validation, e.g. it is not a valid JSON Schema.
    fn validate(&self, instance: &JsonValue, schema: &SchemaNode)
        -> Result<ValidationOutcome, Error>;

    /// Like [`Validator::validate`], without collecting error messages.
    ///
    /// # Errors
    ///
    /// The same as [`Validator::validate`].
    fn is_valid(&self, instance: &JsonValue, schema: &SchemaNode) -> Result<bool, Error> {
        Ok(self.validate(instance, schema)?.is_valid())
    }
}

/// A [`Validator`] backed by the `jsonschema` crate.
///
/// Schema nodes are compiled as `{"$ref": "<node URI>"}`, so references inside the subschema
/// resolve against its own document. Documents are fetched from the shared [`SchemaStorage`].
/// Compiled validators are cached by node URI.
pub struct JsonSchemaValidator {
    storage: SchemaStorage,
    draft: Draft,
    compiled: Mutex<AHashMap<String, Arc<jsonschema::Validator>>>,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("draft", &self.draft)
            .field("compiled", &self.compiled.lock().len())
            .finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Validator interpreting schemas without `$schema` as Draft 7.
    #[must_use]
    pub fn new(storage: SchemaStorage) -> JsonSchemaValidator {
        JsonSchemaValidator {
            storage,
            draft: Draft::Draft7,
            compiled: Mutex::new(AHashMap::new()),
        }
    }
    /// Set the draft for schemas that do not declare `$schema`.
    #[must_use]
    pub fn with_draft(mut self, draft: Draft) -> JsonSchemaValidator {
        self.draft = draft;
        self
    }

    fn compiled(&self, uri: &str) -> Result<Arc<jsonschema::Validator>, Error> {
        if let Some(validator) = self.compiled.lock().get(uri) {
            return Ok(Arc::clone(validator));
        }
        let schema = json!({"$ref": uri});
        let validator = jsonschema::options()
            .with_draft(self.draft)
            .with_retriever(StorageRetriever {
                storage: self.storage.clone(),
            })
            .build(&schema)
            .map_err(|error| Error::InvalidSchema {
                schema_uri: uri.to_string(),
                message: error.to_string(),
            })?;
        let validator = Arc::new(validator);
        self.compiled
            .lock()
            .insert(uri.to_string(), Arc::clone(&validator));
        Ok(validator)
    }
}

impl Validator for JsonSchemaValidator {
    fn validate(
        &self,
        instance: &JsonValue,
        schema: &SchemaNode,
    ) -> Result<ValidationOutcome, Error> {
        let Some(uri) = schema.uri() else {
            return Ok(ValidationOutcome::valid());
        };
        let validator = self.compiled(&uri)?;
        let instance = Value::from(instance);
        let errors = validator
            .iter_errors(&instance)
            .map(|error| ValidationError::new(error.instance_path().as_str(), error.to_string()))
            .collect();
        Ok(ValidationOutcome::new(errors))
    }

    fn is_valid(&self, instance: &JsonValue, schema: &SchemaNode) -> Result<bool, Error> {
        let Some(uri) = schema.uri() else {
            return Ok(true);
        };
        let validator = self.compiled(&uri)?;
        Ok(validator.is_valid(&Value::from(instance)))
    }
}

/// Serves documents to `jsonschema` from the storage.
struct StorageRetriever {
    storage: SchemaStorage,
}

impl jsonschema::Retrieve for StorageRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let url = Url::parse(uri.as_str())?;
        let document = self.storage.document(&url)?;
        Ok(document.contents().clone())
    }
}
