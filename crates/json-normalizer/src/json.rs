use std::{fmt, str::FromStr};

use crate::{error::InvalidJsonEncoded, Format, JsonValue};

/// A JSON document, kept both as text and as a decoded value.
///
/// The encoded form is exactly the text the document was created from, so callers can compare it
/// with a normalized result to detect whether anything changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json {
    encoded: String,
    decoded: JsonValue,
}

impl Json {
    /// Decode `encoded`.
    ///
    /// # Errors
    ///
    /// If `encoded` is not valid JSON.
    pub fn from_encoded(encoded: &str) -> Result<Json, InvalidJsonEncoded> {
        let decoded = serde_json::from_str::<JsonValue>(encoded)
            .map_err(|error| InvalidJsonEncoded::new(encoded, error))?;
        Ok(Json {
            encoded: encoded.to_string(),
            decoded,
        })
    }
    /// Build a document from a value, using the compact encoding.
    #[must_use]
    pub fn from_value(decoded: JsonValue) -> Json {
        Json {
            encoded: decoded.to_string(),
            decoded,
        }
    }
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
    #[must_use]
    pub fn decoded(&self) -> &JsonValue {
        &self.decoded
    }
    /// Layout of the encoded text.
    #[must_use]
    pub fn format(&self) -> Format {
        Format::from_json(self)
    }
    #[must_use]
    pub fn into_decoded(self) -> JsonValue {
        self.decoded
    }
}

impl FromStr for Json {
    type Err = InvalidJsonEncoded;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Json::from_encoded(s)
    }
}

impl From<JsonValue> for Json {
    fn from(value: JsonValue) -> Self {
        Json::from_value(value)
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
