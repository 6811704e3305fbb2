//! Sample values synthesized from resolved schemas
//!
//! Used to pre-fill request bodies and required parameters. Only the
//! structural shape of a schema is consulted; validation keywords are ignored.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::schema::{SchemaNode, SchemaType};

const SAMPLE_STRING: &str = "sample string";
const SAMPLE_EMAIL: &str = "user@example.com";
const SAMPLE_DATE: &str = "2024-01-01";
const SAMPLE_DATE_TIME: &str = "2024-01-01T00:00:00Z";
const SAMPLE_UUID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// A representative value for one schema position
///
/// `example` wins over `default`, which wins over a literal chosen by type.
/// Absent, unresolved or untyped schemas yield `null`.
pub fn sample_value(schema: Option<&SchemaNode>) -> Value {
    let Some(schema) = schema.and_then(SchemaNode::as_schema) else {
        return Value::Null;
    };

    if let Some(example) = &schema.example {
        return example.clone();
    }
    if let Some(default) = &schema.default {
        return default.clone();
    }

    match schema.schema_type {
        Some(SchemaType::String) => {
            let literal = match schema.format.as_deref() {
                Some("email") => SAMPLE_EMAIL,
                Some("date") => SAMPLE_DATE,
                Some("date-time") => SAMPLE_DATE_TIME,
                Some("uuid") => SAMPLE_UUID,
                _ => SAMPLE_STRING,
            };
            Value::String(literal.to_string())
        }
        Some(SchemaType::Number) => json!(123.45),
        Some(SchemaType::Integer) => json!(123),
        Some(SchemaType::Boolean) => Value::Bool(true),
        Some(SchemaType::Object) => schema
            .properties
            .as_ref()
            .map_or_else(|| Value::Object(Map::new()), sample_object),
        Some(SchemaType::Array) => Value::Array(vec![sample_value(schema.items.as_deref())]),
        Some(SchemaType::Null) | None => Value::Null,
    }
}

/// A representative request body for a schema
///
/// Objects get every declared property, required or not; arrays get one
/// element. An absent schema yields `{}`.
pub fn sample_data(schema: Option<&SchemaNode>) -> Value {
    let Some(node) = schema else {
        return Value::Object(Map::new());
    };

    let Some(inline) = node.as_schema() else {
        return sample_value(Some(node));
    };

    match (inline.schema_type, &inline.properties, &inline.items) {
        (Some(SchemaType::Object), Some(props), _) => sample_object(props),
        (Some(SchemaType::Array), _, Some(items)) => Value::Array(vec![sample_value(Some(&**items))]),
        _ => sample_value(Some(node)),
    }
}

/// A single default scalar for pre-filling a required parameter
pub fn default_scalar(schema: Option<&SchemaNode>) -> String {
    let Some(schema) = schema.and_then(SchemaNode::as_schema) else {
        return String::new();
    };

    if let Some(value) = schema.example.as_ref().or(schema.default.as_ref()) {
        return stringify(value);
    }

    match schema.schema_type {
        Some(SchemaType::Number) | Some(SchemaType::Integer) => "0".to_string(),
        Some(SchemaType::Boolean) => "false".to_string(),
        _ => String::new(),
    }
}

fn sample_object(props: &IndexMap<String, Option<SchemaNode>>) -> Value {
    Value::Object(
        props
            .iter()
            .map(|(name, prop)| (name.clone(), sample_value(prop.as_ref())))
            .collect(),
    )
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
