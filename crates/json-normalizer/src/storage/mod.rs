//! Storage of schema documents and `$ref` resolution.
//!
//! Documents are identified by absolute URIs. They are either registered upfront via
//! [`StorageOptions::with_document`] or fetched lazily through a [`Retrieve`] implementation and
//! cached for the lifetime of the storage.
mod node;
mod retriever;

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde_json::Value;
use url::Url;

pub use node::{Items, SchemaDocument, SchemaNode};
pub use retriever::{DefaultRetriever, IntoRetriever, Retrieve, RetrieveError, Retrieved};

use crate::{pointer, Error};

/// A shared collection of schema documents.
///
/// Cloning the storage is cheap and all clones share the same documents.
#[derive(Clone)]
pub struct SchemaStorage {
    inner: Arc<Inner>,
}

struct Inner {
    documents: RwLock<AHashMap<Url, Arc<SchemaDocument>>>,
    retriever: Arc<dyn Retrieve>,
}

impl std::fmt::Debug for SchemaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let documents = self.inner.documents.read();
        f.debug_struct("SchemaStorage")
            .field("documents", &documents.keys().map(Url::as_str).collect::<Vec<_>>())
            .field("retriever", &"<dyn Retrieve>")
            .finish()
    }
}

impl Default for SchemaStorage {
    fn default() -> Self {
        SchemaStorage::new()
    }
}

impl SchemaStorage {
    /// An empty storage that retrieves documents with [`DefaultRetriever`].
    #[must_use]
    pub fn new() -> SchemaStorage {
        SchemaStorage::from_parts(Arc::new(DefaultRetriever), AHashMap::new())
    }
    /// Configuration options for creating a [`SchemaStorage`].
    #[must_use]
    pub fn options() -> StorageOptions {
        StorageOptions::new()
    }

    fn from_parts(
        retriever: Arc<dyn Retrieve>,
        documents: AHashMap<Url, Arc<SchemaDocument>>,
    ) -> SchemaStorage {
        SchemaStorage {
            inner: Arc::new(Inner {
                documents: RwLock::new(documents),
                retriever,
            }),
        }
    }

    /// Whether a document is already present, without retrieving it.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        Url::parse(uri).is_ok_and(|mut uri| {
            uri.set_fragment(None);
            self.inner.documents.read().contains_key(&uri)
        })
    }

    /// Get the schema at `uri`.
    ///
    /// A fragment, if present, must be a JSON Pointer into the document.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaUriCouldNotBeResolved`] if the URI is malformed or the fragment does not
    ///   point into the document;
    /// - [`Error::SchemaUriCouldNotBeRead`] if the document does not exist or can not be fetched;
    /// - [`Error::SchemaUriReferencesDocumentWithInvalidMediaType`] if the document was served
    ///   with a media type other than JSON;
    /// - [`Error::SchemaUriReferencesInvalidJsonDocument`] if the document is not valid JSON.
    pub fn get_schema(&self, uri: &str) -> Result<SchemaNode, Error> {
        let parsed = Url::parse(uri).map_err(|_| Error::could_not_be_resolved(uri))?;
        self.get_schema_by_url(parsed, uri)
    }

    /// Dereference the `$ref` of `node`.
    ///
    /// Relative references are resolved against the URI of the document containing `node`.
    /// Nodes without a string `$ref` are returned unchanged.
    ///
    /// # Errors
    ///
    /// The same as [`SchemaStorage::get_schema`], reported for the resolved reference URI.
    pub fn resolve_ref(&self, node: &SchemaNode) -> Result<SchemaNode, Error> {
        let Some(reference) = node.reference() else {
            return Ok(node.clone());
        };
        let target = match node.document() {
            Some(document) => document.uri().join(reference),
            None => Url::parse(reference),
        }
        .map_err(|_| Error::could_not_be_resolved(reference))?;
        let uri = target.to_string();
        tracing::trace!(reference, target = %uri, "Dereferencing schema");
        self.get_schema_by_url(target, &uri)
    }

    /// Get a whole document, retrieving it if it is not present yet.
    ///
    /// # Errors
    ///
    /// The same as [`SchemaStorage::get_schema`], except that fragments are ignored.
    pub fn document(&self, uri: &Url) -> Result<Arc<SchemaDocument>, Error> {
        let mut uri = uri.clone();
        uri.set_fragment(None);
        if let Some(document) = self.inner.documents.read().get(&uri) {
            return Ok(Arc::clone(document));
        }
        tracing::debug!(uri = %uri, "Retrieving schema document");
        let retrieved = self
            .inner
            .retriever
            .retrieve(&uri)
            .map_err(|error| {
                tracing::debug!(uri = %uri, %error, "Schema document could not be retrieved");
                Error::could_not_be_read(uri.as_str())
            })?;
        if !retrieved.has_schema_media_type() {
            return Err(Error::invalid_media_type(uri.as_str()));
        }
        let contents: Value = serde_json::from_str(&retrieved.into_content())
            .map_err(|_| Error::invalid_json_document(uri.as_str()))?;
        let document = Arc::new(SchemaDocument::new(uri.clone(), contents));
        // Another caller may have retrieved the same document in the meantime; keep the first one
        let mut documents = self.inner.documents.write();
        Ok(Arc::clone(documents.entry(uri).or_insert(document)))
    }

    fn get_schema_by_url(&self, mut url: Url, uri: &str) -> Result<SchemaNode, Error> {
        let fragment = url.fragment().map(str::to_string);
        url.set_fragment(None);
        let document = self.document(&url).map_err(|error| match error {
            // Report the URI as given by the caller
            Error::SchemaUriCouldNotBeRead { .. } => Error::could_not_be_read(uri),
            Error::SchemaUriReferencesDocumentWithInvalidMediaType { .. } => {
                Error::invalid_media_type(uri)
            }
            Error::SchemaUriReferencesInvalidJsonDocument { .. } => {
                Error::invalid_json_document(uri)
            }
            other => other,
        })?;
        let pointer = match fragment.as_deref() {
            None => String::new(),
            Some(fragment) => {
                pointer::from_fragment(fragment).ok_or_else(|| Error::could_not_be_resolved(uri))?
            }
        };
        if pointer.is_empty() {
            return Ok(SchemaNode::root(document));
        }
        SchemaNode::at(document, pointer).ok_or_else(|| Error::could_not_be_resolved(uri))
    }
}

/// Configuration options for creating a [`SchemaStorage`].
pub struct StorageOptions {
    retriever: Arc<dyn Retrieve>,
    documents: Vec<(String, Value)>,
}

impl Default for StorageOptions {
    fn default() -> Self {
        StorageOptions::new()
    }
}

impl StorageOptions {
    /// Create a new [`StorageOptions`] with default settings.
    #[must_use]
    pub fn new() -> StorageOptions {
        StorageOptions {
            retriever: Arc::new(DefaultRetriever),
            documents: Vec::new(),
        }
    }
    /// Set a custom retriever for documents that are not registered upfront.
    #[must_use]
    pub fn retriever(mut self, retriever: impl IntoRetriever) -> StorageOptions {
        self.retriever = retriever.into_retriever();
        self
    }
    /// Register a document under `uri`.
    #[must_use]
    pub fn with_document(mut self, uri: impl Into<String>, document: Value) -> StorageOptions {
        self.documents.push((uri.into(), document));
        self
    }
    /// Create a [`SchemaStorage`] using these options.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaUriCouldNotBeResolved`] if any registered URI is not an absolute URI.
    pub fn build(self) -> Result<SchemaStorage, Error> {
        let mut documents = AHashMap::with_capacity(self.documents.len());
        for (uri, contents) in self.documents {
            let mut parsed = Url::parse(uri.trim_end_matches('#'))
                .map_err(|_| Error::could_not_be_resolved(uri.as_str()))?;
            parsed.set_fragment(None);
            let document = Arc::new(SchemaDocument::new(parsed.clone(), contents));
            documents.insert(parsed, document);
        }
        Ok(SchemaStorage::from_parts(self.retriever, documents))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use serde_json::json;
    use test_case::test_case;
    use url::Url;

    use super::{Retrieve, RetrieveError, Retrieved, SchemaStorage};
    use crate::Error;

    struct FixedRetriever {
        calls: Arc<AtomicUsize>,
    }

    impl Retrieve for FixedRetriever {
        fn retrieve(&self, uri: &Url) -> Result<Retrieved, RetrieveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match uri.path() {
                "/schema.json" => Ok(Retrieved::with_media_type(
                    r#"{"definitions": {"name": {"type": "string"}}}"#,
                    "application/schema+json",
                )),
                "/page.html" => Ok(Retrieved::with_media_type("<html></html>", "text/html")),
                "/broken.json" => Ok(Retrieved::new("{\"type\": ")),
                _ => Err(RetrieveError::NotFound),
            }
        }
    }

    fn storage() -> (SchemaStorage, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let storage = SchemaStorage::options()
            .retriever(FixedRetriever {
                calls: Arc::clone(&calls),
            })
            .with_document(
                "https://example.com/root.json",
                json!({
                    "definitions": {"foo": {"type": "integer"}},
                    "properties": {
                        "local": {"$ref": "#/definitions/foo"},
                        "remote": {"$ref": "schema.json#/definitions/name"},
                        "missing": {"$ref": "#/definitions/missing"}
                    }
                }),
            )
            .build()
            .expect("Valid storage");
        (storage, calls)
    }

    #[test]
    fn registered_documents_are_not_retrieved() {
        let (storage, calls) = storage();
        let node = storage
            .get_schema("https://example.com/root.json")
            .expect("Registered document");
        assert_eq!(node.pointer(), "");
        assert!(storage.contains("https://example.com/root.json#"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fragments_are_pointers() {
        let (storage, _) = storage();
        let node = storage
            .get_schema("https://example.com/root.json#/definitions/foo")
            .expect("Existing pointer");
        assert_eq!(node.value(), &json!({"type": "integer"}));
    }

    #[test]
    fn local_reference() {
        let (storage, _) = storage();
        let node = storage
            .get_schema("https://example.com/root.json#/properties/local")
            .expect("Existing pointer");
        let resolved = storage.resolve_ref(&node).expect("Resolvable reference");
        assert_eq!(resolved.pointer(), "/definitions/foo");
        assert_eq!(
            resolved.uri().as_deref(),
            Some("https://example.com/root.json#/definitions/foo")
        );
    }

    #[test]
    fn remote_documents_are_retrieved_once() {
        let (storage, calls) = storage();
        let node = storage
            .get_schema("https://example.com/root.json#/properties/remote")
            .expect("Existing pointer");
        for _ in 0..3 {
            let resolved = storage.resolve_ref(&node).expect("Resolvable reference");
            assert_eq!(resolved.value(), &json!({"type": "string"}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(storage.contains("https://example.com/schema.json"));
    }

    #[test]
    fn dangling_reference() {
        let (storage, _) = storage();
        let node = storage
            .get_schema("https://example.com/root.json#/properties/missing")
            .expect("Existing pointer");
        let error = storage.resolve_ref(&node).expect_err("Dangling reference");
        assert!(matches!(
            error,
            Error::SchemaUriCouldNotBeResolved { ref schema_uri } if schema_uri == "https://example.com/root.json#/definitions/missing"
        ));
    }

    #[test]
    fn nodes_without_reference_are_unchanged() {
        let (storage, _) = storage();
        let node = storage
            .get_schema("https://example.com/root.json#/definitions/foo")
            .expect("Existing pointer");
        assert_eq!(storage.resolve_ref(&node).expect("No reference"), node);
    }

    #[test_case("not a uri", "could not be resolved"; "malformed uri")]
    #[test_case("https://example.com/root.json#anchor", "could not be resolved"; "anchor fragment")]
    #[test_case("https://example.com/missing.json", "does not reference a document that could be read"; "missing document")]
    #[test_case("https://example.com/page.html", "does not reference a document with media type"; "invalid media type")]
    #[test_case("https://example.com/broken.json", "does not reference a document with valid JSON syntax"; "invalid json")]
    fn classified_failures(uri: &str, expected: &str) {
        let (storage, _) = storage();
        let error = storage.get_schema(uri).expect_err("Should fail");
        assert_eq!(error.schema_uri(), Some(uri));
        assert!(
            error.to_string().contains(expected),
            "Unexpected error: {error}"
        );
    }

    #[test]
    fn invalid_registered_uri() {
        let error = SchemaStorage::options()
            .with_document("relative/schema.json", json!({}))
            .build()
            .expect_err("Relative URI");
        assert!(matches!(error, Error::SchemaUriCouldNotBeResolved { .. }));
    }
}
