//! `$ref` resolver for OpenAPI documents

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::error::ResolveError;
use crate::schema::{Schema, SchemaNode};

/// Resolves `$ref` references in schemas against the owning document
///
/// References are local JSON pointers (`#/components/schemas/Pet`) walked from
/// the document root. Resolution is transitive: a referenced schema is itself
/// resolved. The chain of pointers being expanded is tracked so that a cycle
/// is reported as [`ResolveError::CyclicReference`] instead of recursing
/// forever.
pub struct SchemaResolver<'a> {
    /// Root of the OpenAPI document
    document: &'a Value,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver over the given document root
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Resolve a schema, following every reachable `$ref`
    ///
    /// Never fails: an unresolvable or cyclic reference is logged and the
    /// schema degrades to `None`.
    pub fn resolve(&self, schema: Option<&SchemaNode>) -> Option<SchemaNode> {
        let schema = schema?;
        match self.try_resolve(schema) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Resolve a schema, surfacing cycles as errors
    ///
    /// Missing references still degrade to `None` at their position.
    pub fn try_resolve(&self, schema: &SchemaNode) -> Result<Option<SchemaNode>, ResolveError> {
        let mut chain = Vec::new();
        self.resolve_node(schema, &mut chain)
    }

    fn resolve_node(
        &self,
        node: &SchemaNode,
        chain: &mut Vec<String>,
    ) -> Result<Option<SchemaNode>, ResolveError> {
        match node {
            SchemaNode::Ref(pointer) => {
                if chain.contains(pointer) {
                    return Err(ResolveError::CyclicReference {
                        pointer: pointer.clone(),
                        chain: chain.clone(),
                    });
                }

                let target = match self.schema_at(pointer) {
                    Ok(target) => target,
                    Err(e) => {
                        warn!("{}", e);
                        return Ok(None);
                    }
                };

                chain.push(pointer.clone());
                let resolved = self.resolve_node(&target, chain);
                chain.pop();
                resolved
            }
            SchemaNode::Inline(schema) => {
                let properties = match &schema.properties {
                    Some(props) => Some(self.resolve_properties(props, chain)?),
                    None => None,
                };

                let items = match &schema.items {
                    Some(items) => self.resolve_node(items, chain)?.map(Box::new),
                    None => None,
                };

                let resolved = Schema {
                    properties,
                    items,
                    all_of: self.resolve_members(&schema.all_of, chain)?,
                    any_of: self.resolve_members(&schema.any_of, chain)?,
                    one_of: self.resolve_members(&schema.one_of, chain)?,
                    schema_type: schema.schema_type,
                    format: schema.format.clone(),
                    description: schema.description.clone(),
                    example: schema.example.clone(),
                    default: schema.default.clone(),
                    extra: schema.extra.clone(),
                };

                Ok(Some(SchemaNode::inline(resolved)))
            }
        }
    }

    fn resolve_properties(
        &self,
        props: &IndexMap<String, Option<SchemaNode>>,
        chain: &mut Vec<String>,
    ) -> Result<IndexMap<String, Option<SchemaNode>>, ResolveError> {
        let mut result = IndexMap::with_capacity(props.len());
        for (name, prop) in props {
            let resolved = match prop {
                Some(prop) => self.resolve_node(prop, chain)?,
                None => None,
            };
            result.insert(name.clone(), resolved);
        }
        Ok(result)
    }

    fn resolve_members(
        &self,
        members: &Option<Vec<Option<SchemaNode>>>,
        chain: &mut Vec<String>,
    ) -> Result<Option<Vec<Option<SchemaNode>>>, ResolveError> {
        let Some(members) = members else {
            return Ok(None);
        };

        let mut result = Vec::with_capacity(members.len());
        for member in members {
            let resolved = match member {
                Some(member) => self.resolve_node(member, chain)?,
                None => None,
            };
            result.push(resolved);
        }
        Ok(Some(result))
    }

    fn schema_at(&self, pointer: &str) -> Result<SchemaNode, ResolveError> {
        let target = self.lookup(pointer)?;
        SchemaNode::from_value(target).ok_or_else(|| ResolveError::NotASchema(pointer.to_string()))
    }

    /// Walk a local JSON pointer from the document root
    ///
    /// Segments follow JSON Pointer escaping (`~1` is `/`, `~0` is `~`) and
    /// numeric segments index into arrays.
    pub fn lookup(&self, pointer: &str) -> Result<&'a Value, ResolveError> {
        let path = pointer
            .strip_prefix("#/")
            .ok_or_else(|| ResolveError::InvalidReference(pointer.to_string()))?;

        let mut current = self.document;
        for segment in path.split('/') {
            let segment = segment.replace("~1", "/").replace("~0", "~");
            let next = match current {
                Value::Object(obj) => obj.get(&segment),
                Value::Array(arr) => segment.parse::<usize>().ok().and_then(|i| arr.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| ResolveError::MissingReference(pointer.to_string()))?;
        }

        Ok(current)
    }

    /// Follow `$ref` hops on a non-schema object (parameter, request body,
    /// response) until a concrete object is reached
    pub fn dereference(&self, value: &'a Value) -> Result<&'a Value, ResolveError> {
        let mut current = value;
        let mut chain: Vec<String> = Vec::new();

        while let Some(pointer) = current.get("$ref").and_then(Value::as_str) {
            if chain.iter().any(|seen| seen == pointer) {
                return Err(ResolveError::CyclicReference {
                    pointer: pointer.to_string(),
                    chain,
                });
            }
            chain.push(pointer.to_string());
            current = self.lookup(pointer)?;
        }

        Ok(current)
    }
}
