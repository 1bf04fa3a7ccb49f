//! # json-normalizer
//!
//! Schema-guided normalization of JSON documents.
//!
//! Two JSON documents that mean the same thing may still differ in the order of their object
//! keys. This crate rewrites a document into a canonical order derived from a JSON Schema:
//!
//! - properties declared in the schema's `properties` come first, in declaration order;
//! - all remaining properties follow, sorted by key (integer keys first, by value);
//! - array elements keep their order, but are normalized recursively.
//!
//! The schema is followed through `$ref`, `anyOf`, and `oneOf`: for `anyOf` and `oneOf`, the
//! first candidate the value is valid against decides the order.
//!
//! ```rust
//! use json_normalizer::{Json, Normalizer, SchemaNormalizer, SchemaStorage};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = SchemaStorage::options()
//!     .with_document(
//!         "https://example.com/schema.json",
//!         json!({
//!             "properties": {
//!                 "name": {"type": "string"},
//!                 "authors": {
//!                     "items": {"properties": {"name": {}, "email": {}}}
//!                 }
//!             }
//!         }),
//!     )
//!     .build()?;
//! let normalizer = SchemaNormalizer::new("https://example.com/schema.json", storage);
//!
//! let json: Json = r#"{
//!     "license": "MIT",
//!     "authors": [{"email": "jane@example.com", "name": "Jane"}],
//!     "name": "demo"
//! }"#
//! .parse()?;
//! let normalized = normalizer.normalize(&json)?;
//! assert_eq!(
//!     normalized.encoded(),
//!     r#"{"name":"demo","authors":[{"name":"Jane","email":"jane@example.com"}],"license":"MIT"}"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Normalization is all-or-nothing: the document is validated against the schema before and
//! after reordering, and a failed validation is reported as an [`Error`] instead of a partially
//! normalized result.
//!
//! The normalized document uses the compact encoding. [`Json::format`] detects the layout of the
//! original text, and [`Format::print`] writes the normalized value back in that layout.
//!
//! ## Schema retrieval
//!
//! Schemas live in a [`SchemaStorage`]. Documents can be registered upfront, otherwise they are
//! fetched on first use through a [`Retrieve`] implementation. The [`DefaultRetriever`] reads
//! `file://` URIs, and `http(s)://` URIs with the `resolve-http` feature.
//!
//! ## Features
//!
//! - `resolve-file` (default): `file://` support in [`DefaultRetriever`];
//! - `resolve-http`: `http(s)://` support in [`DefaultRetriever`] via blocking `reqwest`;
//! - `arbitrary-precision`: keep numbers exactly as written.
//!
//! ## Composer
//!
//! [`vendor::composer`] contains normalizers for `composer.json` files that go beyond key order.
mod error;
mod format;
mod json;
mod normalizer;
mod pointer;
mod resolver;
mod storage;
mod validator;
mod value;
pub mod vendor;

pub use error::{Error, InvalidJsonEncoded};
pub use format::{Format, Indent, NewLine, Printed};
pub use json::Json;
pub use normalizer::{ChainNormalizer, Normalizer, NormalizerOptions, SchemaNormalizer};
pub use resolver::{Resolver, DEFAULT_MAX_REFERENCE_DEPTH};
pub use storage::{
    DefaultRetriever, IntoRetriever, Items, Retrieve, RetrieveError, Retrieved, SchemaDocument,
    SchemaNode, SchemaStorage, StorageOptions,
};
pub use validator::{JsonSchemaValidator, ValidationError, ValidationOutcome, Validator};
pub use value::{JsonValue, Map, Number};

/// Re-exported so callers can pick a draft for [`JsonSchemaValidator::with_draft`].
pub use jsonschema::Draft;
