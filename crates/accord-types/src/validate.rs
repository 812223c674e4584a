use serde_json::Value;
use thiserror::Error;

use crate::Shape;

#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing record field '{field}'")]
    MissingField { field: String },
    #[error("unexpected record field '{field}'")]
    UnexpectedField { field: String },
    #[error("number {value} is not an integer")]
    NotAnInteger { value: f64 },
    #[error("value supplied where none is accepted")]
    UnexpectedValue,
}

/// Structurally check a JSON value against a shape.
///
/// Records are strict in both directions: a missing non-option field and a
/// field the shape does not declare are both errors.
pub fn validate_value(value: &Value, shape: &Shape) -> Result<(), ShapeError> {
    match shape {
        Shape::Nothing(_) => match value {
            Value::Null => Ok(()),
            _ => Err(ShapeError::UnexpectedValue),
        },
        Shape::Any(_) => Ok(()),
        Shape::Bool(_) => expect_kind(value, matches!(value, Value::Bool(_)), "bool"),
        Shape::Int(_) => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
            Value::Number(n) => Err(ShapeError::NotAnInteger {
                value: n.as_f64().unwrap_or(f64::NAN),
            }),
            other => Err(mismatch("int", other)),
        },
        Shape::Number(_) => expect_kind(value, matches!(value, Value::Number(_)), "number"),
        Shape::Text(_) => expect_kind(value, matches!(value, Value::String(_)), "text"),
        Shape::List(list) => {
            let Value::Array(items) = value else {
                return Err(mismatch("list", value));
            };
            for item in items {
                validate_value(item, &list.list)?;
            }
            Ok(())
        }
        Shape::Record(record) => {
            let Value::Object(fields) = value else {
                return Err(mismatch("record", value));
            };
            for (name, field_shape) in record.record.iter() {
                match fields.get(name) {
                    Some(field_value) => validate_value(field_value, field_shape)?,
                    None if matches!(field_shape, Shape::Option(_)) => {}
                    None => {
                        return Err(ShapeError::MissingField {
                            field: name.clone(),
                        });
                    }
                }
            }
            for name in fields.keys() {
                if !record.record.contains_key(name) {
                    return Err(ShapeError::UnexpectedField {
                        field: name.clone(),
                    });
                }
            }
            Ok(())
        }
        Shape::Map(map) => {
            let Value::Object(entries) = value else {
                return Err(mismatch("map", value));
            };
            for entry in entries.values() {
                validate_value(entry, &map.map)?;
            }
            Ok(())
        }
        Shape::Option(opt) => match value {
            Value::Null => Ok(()),
            other => validate_value(other, &opt.option),
        },
    }
}

fn expect_kind(value: &Value, matches: bool, expected: &'static str) -> Result<(), ShapeError> {
    if matches {
        Ok(())
    } else {
        Err(mismatch(expected, value))
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ShapeError {
    ShapeError::TypeMismatch {
        expected,
        found: value_kind(found),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_missing_field_is_error() {
        let shape = Shape::record([("a", Shape::number()), ("b", Shape::number())]);
        let err = validate_value(&json!({"a": 2}), &shape).unwrap_err();
        assert!(matches!(err, ShapeError::MissingField { field } if field == "b"));
    }

    #[test]
    fn record_unexpected_field_is_error() {
        let shape = Shape::record([("a", Shape::number())]);
        let err = validate_value(&json!({"a": 2, "extra": true}), &shape).unwrap_err();
        assert!(matches!(err, ShapeError::UnexpectedField { field } if field == "extra"));
    }

    #[test]
    fn option_field_may_be_absent_or_null() {
        let shape = Shape::record([("note", Shape::option(Shape::text()))]);
        assert!(validate_value(&json!({}), &shape).is_ok());
        assert!(validate_value(&json!({"note": null}), &shape).is_ok());
        assert!(validate_value(&json!({"note": "hi"}), &shape).is_ok());
        assert!(validate_value(&json!({"note": 3}), &shape).is_err());
    }

    #[test]
    fn int_rejects_fractions() {
        assert!(validate_value(&json!(3), &Shape::int()).is_ok());
        let err = validate_value(&json!(3.5), &Shape::int()).unwrap_err();
        assert!(matches!(err, ShapeError::NotAnInteger { .. }));
    }

    #[test]
    fn list_items_checked() {
        let shape = Shape::list(Shape::text());
        assert!(validate_value(&json!(["a", "b"]), &shape).is_ok());
        let err = validate_value(&json!(["a", 1]), &shape).unwrap_err();
        assert!(matches!(err, ShapeError::TypeMismatch { expected: "text", .. }));
    }

    #[test]
    fn map_values_checked() {
        let shape = Shape::map(Shape::int());
        assert!(validate_value(&json!({"x": 1, "y": 2}), &shape).is_ok());
        assert!(validate_value(&json!({"x": "no"}), &shape).is_err());
    }

    #[test]
    fn nothing_accepts_only_null() {
        assert!(validate_value(&json!(null), &Shape::nothing()).is_ok());
        let err = validate_value(&json!({}), &Shape::nothing()).unwrap_err();
        assert_eq!(err, ShapeError::UnexpectedValue);
    }
}
