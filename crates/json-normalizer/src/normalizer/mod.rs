//! Normalizers turn a JSON document into its canonical form.
mod schema;
mod walk;

pub use schema::{NormalizerOptions, SchemaNormalizer};

use crate::{Error, Json};

/// Rewrites a JSON document into a canonical form.
pub trait Normalizer {
    /// Normalize `json`.
    ///
    /// # Errors
    ///
    /// Implementation-specific. A failed normalization never yields a partial result.
    fn normalize(&self, json: &Json) -> Result<Json, Error>;
}

impl<F> Normalizer for F
where
    F: Fn(&Json) -> Result<Json, Error>,
{
    fn normalize(&self, json: &Json) -> Result<Json, Error> {
        self(json)
    }
}

/// Applies normalizers one after another, feeding each the output of the previous one.
#[derive(Default)]
pub struct ChainNormalizer {
    normalizers: Vec<Box<dyn Normalizer>>,
}

impl ChainNormalizer {
    #[must_use]
    pub fn new() -> ChainNormalizer {
        ChainNormalizer::default()
    }
    /// Append a normalizer to the end of the chain.
    #[must_use]
    pub fn then(mut self, normalizer: impl Normalizer + 'static) -> ChainNormalizer {
        self.normalizers.push(Box::new(normalizer));
        self
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.normalizers.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalizers.is_empty()
    }
}

impl std::fmt::Debug for ChainNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainNormalizer")
            .field("normalizers", &self.normalizers.len())
            .finish()
    }
}

impl Normalizer for ChainNormalizer {
    fn normalize(&self, json: &Json) -> Result<Json, Error> {
        let mut current = json.clone();
        for normalizer in &self.normalizers {
            current = normalizer.normalize(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainNormalizer, Normalizer};
    use crate::{value::Map, Error, Json, JsonValue};

    fn wrap(key: &'static str) -> impl Fn(&Json) -> Result<Json, Error> {
        move |json: &Json| {
            let mut object = Map::new();
            object.insert(key, json.decoded().clone());
            Ok(Json::from_value(JsonValue::Object(object)))
        }
    }

    #[test]
    fn empty_chain_returns_input() {
        let json = Json::from_encoded("{\"a\": 1}").expect("Valid JSON");
        let normalized = ChainNormalizer::new()
            .normalize(&json)
            .expect("Normalizable");
        assert_eq!(normalized, json);
        assert_eq!(normalized.encoded(), "{\"a\": 1}");
    }

    #[test]
    fn normalizers_apply_in_order() {
        let chain = ChainNormalizer::new().then(wrap("inner")).then(wrap("outer"));
        assert_eq!(chain.len(), 2);
        let json = Json::from_encoded("1").expect("Valid JSON");
        let normalized = chain.normalize(&json).expect("Normalizable");
        assert_eq!(normalized.encoded(), r#"{"outer":{"inner":1}}"#);
    }

    #[test]
    fn first_failure_stops_the_chain() {
        let chain = ChainNormalizer::new()
            .then(|json: &Json| -> Result<Json, Error> {
                Err(Error::OriginalInvalidAccordingToSchema {
                    schema_uri: "file:///schema.json".to_string(),
                    errors: vec![json.encoded().to_string()],
                })
            })
            .then(|_: &Json| -> Result<Json, Error> { panic!("Should not be called") });
        let json = Json::from_encoded("null").expect("Valid JSON");
        let error = chain.normalize(&json).expect_err("Failing normalizer");
        assert_eq!(error.errors(), ["null"]);
    }
}
