//! Error types.
use std::fmt::Write;

/// Errors that may happen while normalizing a document.
///
/// None of them is transient: retrying the same call yields the same error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The schema URI is malformed or its fragment does not point into the document.
    #[error("Schema URI \"{schema_uri}\" could not be resolved.")]
    SchemaUriCouldNotBeResolved { schema_uri: String },
    /// The document behind the schema URI does not exist or could not be fetched.
    #[error("Schema URI \"{schema_uri}\" does not reference a document that could be read.")]
    SchemaUriCouldNotBeRead { schema_uri: String },
    /// The document exists, but was served with an unsupported media type.
    #[error("Schema URI \"{schema_uri}\" does not reference a document with media type \"application/schema+json\".")]
    SchemaUriReferencesDocumentWithInvalidMediaType { schema_uri: String },
    /// The document exists, but is not valid JSON.
    #[error("Schema URI \"{schema_uri}\" does not reference a document with valid JSON syntax.")]
    SchemaUriReferencesInvalidJsonDocument { schema_uri: String },
    /// The input does not conform to the schema; normalization was not attempted.
    #[error("Original JSON is not valid according to schema \"{schema_uri}\".{}", bullets(.errors))]
    OriginalInvalidAccordingToSchema {
        schema_uri: String,
        errors: Vec<String>,
    },
    /// Normalization produced a document that does not conform to the schema anymore.
    #[error("Normalized JSON is not valid according to schema \"{schema_uri}\".{}", bullets(.errors))]
    NormalizedInvalidAccordingToSchema {
        schema_uri: String,
        errors: Vec<String>,
    },
    /// The validator could not compile the schema.
    #[error("Schema \"{schema_uri}\" could not be compiled: {message}")]
    InvalidSchema { schema_uri: String, message: String },
    /// Following `$ref` chains did not terminate within the configured limit.
    #[error("Resolving schema \"{schema_uri}\" exceeded the limit of {limit} nested references.")]
    ReferenceDepthExceeded { schema_uri: String, limit: usize },
    /// A document handed to the normalizer is not valid JSON.
    #[error(transparent)]
    InvalidJsonEncoded(#[from] InvalidJsonEncoded),
}

impl Error {
    pub(crate) fn could_not_be_resolved(schema_uri: impl Into<String>) -> Error {
        Error::SchemaUriCouldNotBeResolved {
            schema_uri: schema_uri.into(),
        }
    }
    pub(crate) fn could_not_be_read(schema_uri: impl Into<String>) -> Error {
        Error::SchemaUriCouldNotBeRead {
            schema_uri: schema_uri.into(),
        }
    }
    pub(crate) fn invalid_media_type(schema_uri: impl Into<String>) -> Error {
        Error::SchemaUriReferencesDocumentWithInvalidMediaType {
            schema_uri: schema_uri.into(),
        }
    }
    pub(crate) fn invalid_json_document(schema_uri: impl Into<String>) -> Error {
        Error::SchemaUriReferencesInvalidJsonDocument {
            schema_uri: schema_uri.into(),
        }
    }

    /// The schema URI the error relates to, if any.
    #[must_use]
    pub fn schema_uri(&self) -> Option<&str> {
        match self {
            Error::SchemaUriCouldNotBeResolved { schema_uri }
            | Error::SchemaUriCouldNotBeRead { schema_uri }
            | Error::SchemaUriReferencesDocumentWithInvalidMediaType { schema_uri }
            | Error::SchemaUriReferencesInvalidJsonDocument { schema_uri }
            | Error::OriginalInvalidAccordingToSchema { schema_uri, .. }
            | Error::NormalizedInvalidAccordingToSchema { schema_uri, .. }
            | Error::InvalidSchema { schema_uri, .. }
            | Error::ReferenceDepthExceeded { schema_uri, .. } => Some(schema_uri),
            Error::InvalidJsonEncoded(_) => None,
        }
    }

    /// Validation messages in the order the validator reported them.
    ///
    /// Empty for errors that are not caused by a failed validation.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Error::OriginalInvalidAccordingToSchema { errors, .. }
            | Error::NormalizedInvalidAccordingToSchema { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn bullets(errors: &[String]) -> String {
    let mut out = String::new();
    for error in errors {
        let _ = write!(out, "\n- {error}");
    }
    out
}

/// The given text is not valid JSON.
#[derive(Debug, thiserror::Error)]
#[error("Encoded \"{encoded}\" is not valid JSON.")]
pub struct InvalidJsonEncoded {
    encoded: String,
    #[source]
    source: serde_json::Error,
}

impl InvalidJsonEncoded {
    pub(crate) fn new(encoded: &str, source: serde_json::Error) -> InvalidJsonEncoded {
        InvalidJsonEncoded {
            encoded: encoded.to_string(),
            source,
        }
    }
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}
