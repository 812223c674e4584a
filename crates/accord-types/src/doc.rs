use serde_json::{Value, json};

use crate::Shape;

/// Convert a shape into a portable, JSON Schema compatible description tree.
///
/// The output is a plain value with no dependence on this crate's types, so
/// it can be published out-of-band and consumed from any language.
pub fn schema_doc(shape: &Shape) -> Value {
    match shape {
        // Matches no instance at all.
        Shape::Nothing(_) => json!({"not": {}}),
        // No constraint.
        Shape::Any(_) => json!({}),
        Shape::Bool(_) => json!({"type": "boolean"}),
        Shape::Int(_) => json!({"type": "integer"}),
        Shape::Number(_) => json!({"type": "number"}),
        Shape::Text(_) => json!({"type": "string"}),
        Shape::List(list) => json!({"type": "array", "items": schema_doc(&list.list)}),
        Shape::Record(record) => {
            let mut properties = serde_json::Map::new();
            let mut required = Vec::new();
            for (name, field) in record.record.iter() {
                properties.insert(name.clone(), schema_doc(field));
                if !matches!(field, Shape::Option(_)) {
                    required.push(Value::String(name.clone()));
                }
            }
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            })
        }
        Shape::Map(map) => json!({"type": "object", "additionalProperties": schema_doc(&map.map)}),
        Shape::Option(opt) => json!({"anyOf": [schema_doc(&opt.option), {"type": "null"}]}),
    }
}
