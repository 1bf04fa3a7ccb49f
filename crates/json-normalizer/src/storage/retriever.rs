use std::sync::Arc;

use url::Url;

/// Raw content of a retrieved schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    content: String,
    media_type: Option<String>,
}

impl Retrieved {
    /// Content without a declared media type, e.g. read from a file.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Retrieved {
        Retrieved {
            content: content.into(),
            media_type: None,
        }
    }
    /// Content together with the media type it was served with.
    #[must_use]
    pub fn with_media_type(content: impl Into<String>, media_type: impl Into<String>) -> Retrieved {
        Retrieved {
            content: content.into(),
            media_type: Some(media_type.into()),
        }
    }
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }
    /// Whether the media type, if any, is acceptable for a schema document.
    #[must_use]
    pub fn has_schema_media_type(&self) -> bool {
        let Some(media_type) = &self.media_type else {
            return true;
        };
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        matches!(
            essence.as_str(),
            "application/json" | "application/schema+json"
        )
    }
    pub(crate) fn into_content(self) -> String {
        self.content
    }
}

/// Why a document could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    #[error("Resource not found")]
    NotFound,
    #[error("Unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl RetrieveError {
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RetrieveError {
        RetrieveError::Other(error.into())
    }
}

/// Fetches schema documents that are not registered in the storage upfront.
pub trait Retrieve: Send + Sync {
    /// Retrieve the document at `uri`. The URI never carries a fragment.
    ///
    /// # Errors
    ///
    /// If the document does not exist or can not be fetched.
    fn retrieve(&self, uri: &Url) -> Result<Retrieved, RetrieveError>;
}

pub trait IntoRetriever {
    fn into_retriever(self) -> Arc<dyn Retrieve>;
}

impl<T: Retrieve + 'static> IntoRetriever for T {
    fn into_retriever(self) -> Arc<dyn Retrieve> {
        Arc::new(self)
    }
}

impl IntoRetriever for Arc<dyn Retrieve> {
    fn into_retriever(self) -> Arc<dyn Retrieve> {
        self
    }
}

/// Reads `file://` URIs from disk and, with the `resolve-http` feature, fetches `http(s)://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, uri: &Url) -> Result<Retrieved, RetrieveError> {
        match uri.scheme() {
            #[cfg(feature = "resolve-file")]
            "file" => {
                let path = uri
                    .to_file_path()
                    .map_err(|()| RetrieveError::other(format!("Invalid file path: {uri}")))?;
                match std::fs::read_to_string(path) {
                    Ok(content) => Ok(Retrieved::new(content)),
                    Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                        Err(RetrieveError::NotFound)
                    }
                    Err(error) => Err(RetrieveError::other(error)),
                }
            }
            #[cfg(all(feature = "resolve-http", not(target_arch = "wasm32")))]
            "http" | "https" => {
                let response =
                    reqwest::blocking::get(uri.as_str()).map_err(RetrieveError::other)?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(RetrieveError::NotFound);
                }
                let response = response.error_for_status().map_err(RetrieveError::other)?;
                let media_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let content = response.text().map_err(RetrieveError::other)?;
                Ok(match media_type {
                    Some(media_type) => Retrieved::with_media_type(content, media_type),
                    None => Retrieved::new(content),
                })
            }
            scheme => Err(RetrieveError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;
    use url::Url;

    use super::{DefaultRetriever, Retrieve, RetrieveError, Retrieved};

    #[test_case(None, true; "no media type")]
    #[test_case(Some("application/json"), true; "json")]
    #[test_case(Some("application/schema+json; charset=utf-8"), true; "schema with parameters")]
    #[test_case(Some("Application/JSON"), true; "case insensitive")]
    #[test_case(Some("text/html"), false; "html")]
    fn schema_media_types(media_type: Option<&str>, expected: bool) {
        let retrieved = match media_type {
            Some(media_type) => Retrieved::with_media_type("{}", media_type),
            None => Retrieved::new("{}"),
        };
        assert_eq!(retrieved.has_schema_media_type(), expected);
    }

    #[test]
    fn reads_files() {
        let mut file = tempfile::NamedTempFile::new().expect("Temporary file");
        file.write_all(br#"{"type": "object"}"#)
            .expect("Writable file");
        let uri = Url::from_file_path(file.path()).expect("Absolute path");
        let retrieved = DefaultRetriever.retrieve(&uri).expect("Readable file");
        assert_eq!(retrieved.content(), r#"{"type": "object"}"#);
        assert_eq!(retrieved.media_type(), None);
    }

    #[test]
    fn missing_files_are_not_found() {
        let directory = tempfile::tempdir().expect("Temporary directory");
        let uri = Url::from_file_path(directory.path().join("missing.json")).expect("Absolute path");
        let error = DefaultRetriever.retrieve(&uri).expect_err("Missing file");
        assert!(matches!(error, RetrieveError::NotFound));
    }

    #[test]
    fn unsupported_scheme() {
        let uri = Url::parse("urn:example:schema").expect("Valid URI");
        let error = DefaultRetriever.retrieve(&uri).expect_err("Unsupported scheme");
        assert_eq!(error.to_string(), "Unsupported URI scheme: urn");
    }
}
