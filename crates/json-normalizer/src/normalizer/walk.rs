use crate::{
    resolver::Resolver,
    storage::{Items, SchemaNode},
    value::{compare_keys, Map},
    Error, JsonValue,
};

/// Schema-driven traversal that reorders object keys.
///
/// The walk mirrors the schema rather than the data: declared properties come first, in the order
/// the schema declares them, followed by undeclared properties in ascending key order (integer keys first, by value). Arrays keep
/// their element order; only the elements themselves are normalized.
pub(crate) struct Walker<'a> {
    resolver: Resolver<'a>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(resolver: Resolver<'a>) -> Walker<'a> {
        Walker { resolver }
    }

    pub(crate) fn normalize(
        &self,
        value: &JsonValue,
        schema: &SchemaNode,
    ) -> Result<JsonValue, Error> {
        match value {
            JsonValue::Array(items) => self
                .normalize_array(value, items, schema)
                .map(JsonValue::Array),
            JsonValue::Object(object) => self
                .normalize_object(value, object, schema)
                .map(JsonValue::Object),
            scalar => Ok(scalar.clone()),
        }
    }

    fn normalize_array(
        &self,
        value: &JsonValue,
        items: &[JsonValue],
        schema: &SchemaNode,
    ) -> Result<Vec<JsonValue>, Error> {
        let schema = self.resolver.resolve(value, schema)?;
        match schema.items() {
            Items::Tuple(schemas) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| match schemas.get(idx) {
                    Some(item_schema) => self.normalize(item, item_schema),
                    // Elements beyond the tuple are unconstrained
                    None => self.normalize(item, &SchemaNode::empty()),
                })
                .collect(),
            Items::Single(item_schema) => items
                .iter()
                .map(|item| self.normalize(item, &item_schema))
                .collect(),
            Items::None => {
                let item_schema = SchemaNode::empty();
                items
                    .iter()
                    .map(|item| self.normalize(item, &item_schema))
                    .collect()
            }
        }
    }

    fn normalize_object(
        &self,
        value: &JsonValue,
        object: &Map,
        schema: &SchemaNode,
    ) -> Result<Map, Error> {
        let schema = self.resolver.resolve(value, schema)?;
        let mut normalized = Map::with_capacity(object.len());
        for (name, property_schema) in schema.properties() {
            let Some(property) = object.get(name) else {
                continue;
            };
            let property_schema = self.resolver.resolve(property, &property_schema)?;
            normalized.insert(name, self.normalize(property, &property_schema)?);
        }
        if normalized.len() == object.len() {
            return Ok(normalized);
        }
        let mut additional: Vec<(&str, &JsonValue)> = object
            .iter()
            .filter(|(name, _)| !normalized.contains_key(name))
            .collect();
        additional.sort_unstable_by(|(left, _), (right, _)| compare_keys(left, right));
        let property_schema = SchemaNode::empty();
        for (name, property) in additional {
            normalized.insert(name, self.normalize(property, &property_schema)?);
        }
        Ok(normalized)
    }
}
