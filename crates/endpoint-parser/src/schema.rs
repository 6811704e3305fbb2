//! JSON-Schema-shaped nodes used in endpoint contracts
//!
//! A [`SchemaNode`] is either a `$ref` pointer into the owning document or an
//! inline [`Schema`]. Only the structural keywords the explorer cares about are
//! decoded; every other keyword is kept verbatim in [`Schema::extra`] so that a
//! schema can be shown to the user exactly as declared.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The seven recognized `type` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "object" => Some(SchemaType::Object),
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "null" => Some(SchemaType::Null),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A schema position: a reference or an inline schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `{"$ref": "#/components/schemas/Pet"}`
    Ref(String),
    /// Any other schema object
    Inline(Box<Schema>),
}

/// An inline schema object
///
/// Child positions are `Option<SchemaNode>` where a reference may fail to
/// resolve: a `None` child renders as `null`, matching how an unavailable
/// schema is shown everywhere else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    /// Recognized `type` tag; unrecognized tags stay in `extra`
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub description: Option<String>,
    /// `Some(Value::Null)` means an explicit `"example": null`
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub properties: Option<IndexMap<String, Option<SchemaNode>>>,
    pub items: Option<Box<SchemaNode>>,
    pub all_of: Option<Vec<Option<SchemaNode>>>,
    pub any_of: Option<Vec<Option<SchemaNode>>>,
    pub one_of: Option<Vec<Option<SchemaNode>>>,
    /// Every keyword not listed above, passed through untouched
    pub extra: Map<String, Value>,
}

impl Schema {
    /// A bare schema of the given type
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }
}

impl SchemaNode {
    /// Build a reference node
    pub fn reference(pointer: impl Into<String>) -> Self {
        SchemaNode::Ref(pointer.into())
    }

    /// Wrap an inline schema
    pub fn inline(schema: Schema) -> Self {
        SchemaNode::Inline(Box::new(schema))
    }

    /// The inline schema, if this node is not a reference
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaNode::Ref(_) => None,
            SchemaNode::Inline(schema) => Some(schema),
        }
    }

    /// The declared type tag of an inline schema
    pub fn schema_type(&self) -> Option<SchemaType> {
        self.as_schema().and_then(|s| s.schema_type)
    }

    /// True when no `$ref` remains in the positions the resolver expands:
    /// `properties`, `items` and `allOf`/`anyOf`/`oneOf` members
    ///
    /// Keywords kept in `extra` (such as `additionalProperties` or `not`)
    /// are passed through untouched and not inspected.
    pub fn is_resolved(&self) -> bool {
        match self {
            SchemaNode::Ref(_) => false,
            SchemaNode::Inline(schema) => {
                let members_resolved = |members: &Option<Vec<Option<SchemaNode>>>| {
                    members
                        .iter()
                        .flatten()
                        .flatten()
                        .all(SchemaNode::is_resolved)
                };

                schema
                    .properties
                    .iter()
                    .flat_map(|props| props.values())
                    .flatten()
                    .all(SchemaNode::is_resolved)
                    && schema.items.as_deref().map_or(true, SchemaNode::is_resolved)
                    && members_resolved(&schema.all_of)
                    && members_resolved(&schema.any_of)
                    && members_resolved(&schema.one_of)
            }
        }
    }

    /// Decode a schema from raw JSON
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        if let Some(pointer) = obj.get("$ref").and_then(Value::as_str) {
            return Some(SchemaNode::Ref(pointer.to_string()));
        }

        let mut schema = Schema::default();
        for (key, value) in obj {
            match key.as_str() {
                "type" => match value.as_str().and_then(SchemaType::parse) {
                    Some(t) => schema.schema_type = Some(t),
                    None => {
                        schema.extra.insert(key.clone(), value.clone());
                    }
                },
                "format" if value.is_string() => {
                    schema.format = value.as_str().map(str::to_string);
                }
                "description" if value.is_string() => {
                    schema.description = value.as_str().map(str::to_string);
                }
                "example" => schema.example = Some(value.clone()),
                "default" => schema.default = Some(value.clone()),
                "properties" if value.is_object() => {
                    schema.properties = value.as_object().map(|props| {
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), SchemaNode::from_value(prop)))
                            .collect()
                    });
                }
                "items" if value.is_object() => {
                    schema.items = SchemaNode::from_value(value).map(Box::new);
                }
                "allOf" if value.is_array() => schema.all_of = members_from_value(value),
                "anyOf" if value.is_array() => schema.any_of = members_from_value(value),
                "oneOf" if value.is_array() => schema.one_of = members_from_value(value),
                _ => {
                    schema.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Some(SchemaNode::inline(schema))
    }

    /// Encode back to raw JSON
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Ref(pointer) => {
                let mut obj = Map::new();
                obj.insert("$ref".to_string(), Value::String(pointer.clone()));
                Value::Object(obj)
            }
            SchemaNode::Inline(schema) => {
                let mut obj = Map::new();
                if let Some(t) = schema.schema_type {
                    obj.insert("type".to_string(), Value::String(t.as_str().to_string()));
                }
                if let Some(format) = &schema.format {
                    obj.insert("format".to_string(), Value::String(format.clone()));
                }
                if let Some(description) = &schema.description {
                    obj.insert("description".to_string(), Value::String(description.clone()));
                }
                if let Some(props) = &schema.properties {
                    let props = props
                        .iter()
                        .map(|(name, prop)| (name.clone(), optional_to_value(prop)))
                        .collect();
                    obj.insert("properties".to_string(), Value::Object(props));
                }
                if let Some(items) = &schema.items {
                    obj.insert("items".to_string(), items.to_value());
                }
                for (key, members) in [
                    ("allOf", &schema.all_of),
                    ("anyOf", &schema.any_of),
                    ("oneOf", &schema.one_of),
                ] {
                    if let Some(members) = members {
                        let members = members.iter().map(optional_to_value).collect();
                        obj.insert(key.to_string(), Value::Array(members));
                    }
                }
                if let Some(example) = &schema.example {
                    obj.insert("example".to_string(), example.clone());
                }
                if let Some(default) = &schema.default {
                    obj.insert("default".to_string(), default.clone());
                }
                for (key, value) in &schema.extra {
                    obj.insert(key.clone(), value.clone());
                }
                Value::Object(obj)
            }
        }
    }
}

fn members_from_value(value: &Value) -> Option<Vec<Option<SchemaNode>>> {
    value
        .as_array()
        .map(|arr| arr.iter().map(SchemaNode::from_value).collect())
}

fn optional_to_value(node: &Option<SchemaNode>) -> Value {
    node.as_ref().map_or(Value::Null, SchemaNode::to_value)
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaNode::from_value(&value)
            .ok_or_else(|| de::Error::custom("expected a schema object"))
    }
}
