//! Resolution of indirect schemas.
//!
//! A schema node may not describe a value directly: it can delegate to one of several candidates
//! (`anyOf`, `oneOf`) or to another location (`$ref`). Resolution follows these indirections until
//! it reaches the node that actually applies to a given value.
use crate::{
    storage::{SchemaNode, SchemaStorage},
    validator::Validator,
    Error, JsonValue,
};

/// Default limit on `$ref` hops followed during a single resolution.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 64;

/// Resolves schema nodes against concrete values.
pub struct Resolver<'a> {
    storage: &'a SchemaStorage,
    validator: &'a dyn Validator,
    max_reference_depth: usize,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(storage: &'a SchemaStorage, validator: &'a dyn Validator) -> Resolver<'a> {
        Resolver {
            storage,
            validator,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }
    #[must_use]
    pub fn with_max_reference_depth(mut self, max_reference_depth: usize) -> Resolver<'a> {
        self.max_reference_depth = max_reference_depth;
        self
    }

    /// Return the most specific schema node applicable to `value`.
    ///
    /// Checks, in this order:
    ///
    /// 1. `anyOf` - the first candidate `value` is valid against, resolved recursively;
    /// 2. `oneOf` - the same probing as for `anyOf`;
    /// 3. `$ref` - the referenced node, resolved recursively.
    ///
    /// If no candidate matches and there is no `$ref`, `schema` is returned as is.
    ///
    /// # Errors
    ///
    /// If a reference can not be dereferenced, the validator can not use a candidate, or more
    /// than the configured number of nested references is followed.
    pub fn resolve(&self, value: &JsonValue, schema: &SchemaNode) -> Result<SchemaNode, Error> {
        self.resolve_at_depth(value, schema, 0)
    }

    fn resolve_at_depth(
        &self,
        value: &JsonValue,
        schema: &SchemaNode,
        depth: usize,
    ) -> Result<SchemaNode, Error> {
        for (keyword, candidates) in [("anyOf", schema.any_of()), ("oneOf", schema.one_of())] {
            let Some(candidates) = candidates else {
                continue;
            };
            for candidate in candidates {
                if self.validator.is_valid(value, &candidate)? {
                    tracing::trace!(
                        keyword,
                        candidate = candidate.pointer(),
                        kind = value.kind(),
                        "Selected candidate schema"
                    );
                    return self.resolve_at_depth(value, &candidate, depth);
                }
            }
        }
        if schema.reference().is_some() {
            if depth >= self.max_reference_depth {
                return Err(Error::ReferenceDepthExceeded {
                    schema_uri: schema.uri().unwrap_or_default(),
                    limit: self.max_reference_depth,
                });
            }
            let referenced = self.storage.resolve_ref(schema)?;
            return self.resolve_at_depth(value, &referenced, depth + 1);
        }
        Ok(schema.clone())
    }
}
