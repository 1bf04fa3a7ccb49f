use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use serde_json::Value;
use url::Url;

use crate::pointer;

static EMPTY_SCHEMA: LazyLock<Value> = LazyLock::new(|| Value::Object(serde_json::Map::new()));

/// A schema document owned by [`SchemaStorage`](super::SchemaStorage).
#[derive(Debug)]
pub struct SchemaDocument {
    uri: Url,
    contents: Value,
}

impl SchemaDocument {
    pub(crate) fn new(uri: Url, contents: Value) -> SchemaDocument {
        SchemaDocument { uri, contents }
    }
    /// The URI the document was registered or retrieved under, without a fragment.
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }
    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }
}

/// The `items` keyword of a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// No `items` keyword.
    None,
    /// One schema for every element.
    Single(SchemaNode),
    /// One schema per position.
    Tuple(Vec<SchemaNode>),
}

/// A read-only handle to a subschema inside a stored document.
///
/// Cloning is cheap: the handle shares the document and only carries the JSON Pointer to the
/// subschema.
#[derive(Clone)]
pub struct SchemaNode {
    /// `None` for the permissive empty schema that is not part of any document.
    document: Option<Arc<SchemaDocument>>,
    pointer: String,
}

impl SchemaNode {
    pub(crate) fn root(document: Arc<SchemaDocument>) -> SchemaNode {
        SchemaNode {
            document: Some(document),
            pointer: String::new(),
        }
    }
    /// A node at `pointer`, if the document has a value there.
    pub(crate) fn at(document: Arc<SchemaDocument>, pointer: String) -> Option<SchemaNode> {
        pointer::pointer(document.contents(), &pointer)?;
        Some(SchemaNode {
            document: Some(document),
            pointer,
        })
    }
    /// The empty schema `{}`, which accepts any value.
    #[must_use]
    pub fn empty() -> SchemaNode {
        SchemaNode {
            document: None,
            pointer: String::new(),
        }
    }
    #[must_use]
    pub fn is_empty_schema(&self) -> bool {
        self.document.is_none()
    }
    #[must_use]
    pub fn document(&self) -> Option<&Arc<SchemaDocument>> {
        self.document.as_ref()
    }
    /// JSON Pointer of this node inside its document.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }
    /// The subschema itself.
    #[must_use]
    pub fn value(&self) -> &Value {
        self.document
            .as_ref()
            .and_then(|document| pointer::pointer(document.contents(), &self.pointer))
            .unwrap_or(&EMPTY_SCHEMA)
    }
    /// Absolute URI of this node, with the pointer as fragment.
    ///
    /// `None` for the empty schema.
    #[must_use]
    pub fn uri(&self) -> Option<String> {
        let document = self.document.as_ref()?;
        if self.pointer.is_empty() {
            Some(document.uri().to_string())
        } else {
            Some(format!(
                "{}#{}",
                document.uri(),
                pointer::to_fragment(&self.pointer)
            ))
        }
    }
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.value().as_object()?.get(keyword)
    }
    #[must_use]
    pub fn has(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }
    /// The `$ref` keyword, if it is a string.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.get("$ref").and_then(Value::as_str)
    }
    /// Subschemas declared in `properties`, in declaration order.
    ///
    /// Yields nothing if `properties` is missing or not an object.
    pub fn properties(&self) -> impl Iterator<Item = (&str, SchemaNode)> + '_ {
        self.get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(move |properties| {
                properties
                    .keys()
                    .map(move |name| (name.as_str(), self.descend("properties").descend(name)))
            })
    }
    #[must_use]
    pub fn property(&self, name: &str) -> Option<SchemaNode> {
        self.get("properties")
            .and_then(Value::as_object)?
            .contains_key(name)
            .then(|| self.descend("properties").descend(name))
    }
    #[must_use]
    pub fn items(&self) -> Items {
        match self.get("items") {
            Some(Value::Array(schemas)) => Items::Tuple(
                (0..schemas.len())
                    .map(|idx| self.descend("items").descend_index(idx))
                    .collect(),
            ),
            Some(_) => Items::Single(self.descend("items")),
            None => Items::None,
        }
    }
    /// Candidates of `anyOf`, if it is an array.
    #[must_use]
    pub fn any_of(&self) -> Option<Vec<SchemaNode>> {
        self.candidates("anyOf")
    }
    /// Candidates of `oneOf`, if it is an array.
    #[must_use]
    pub fn one_of(&self) -> Option<Vec<SchemaNode>> {
        self.candidates("oneOf")
    }

    fn candidates(&self, keyword: &str) -> Option<Vec<SchemaNode>> {
        let schemas = self.get(keyword)?.as_array()?;
        let parent = self.descend(keyword);
        Some(
            (0..schemas.len())
                .map(|idx| parent.descend_index(idx))
                .collect(),
        )
    }
    fn descend(&self, segment: &str) -> SchemaNode {
        SchemaNode {
            document: self.document.clone(),
            pointer: pointer::join(&self.pointer, segment),
        }
    }
    fn descend_index(&self, idx: usize) -> SchemaNode {
        SchemaNode {
            document: self.document.clone(),
            pointer: pointer::join_index(&self.pointer, idx),
        }
    }
}

impl PartialEq for SchemaNode {
    fn eq(&self, other: &Self) -> bool {
        let same_document = match (&self.document, &other.document) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        };
        same_document && self.pointer == other.pointer
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uri() {
            Some(uri) => f.debug_tuple("SchemaNode").field(&uri).finish(),
            None => f.write_str("SchemaNode(<empty>)"),
        }
    }
}
