use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Structural schema for the JSON values a route accepts or produces.
///
/// The authoring format keys every node by a single field naming its kind,
/// so `{"text":{}}` is a text shape and `{"record":{"a":{"int":{}}}}` is a
/// record with one integer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Nothing(ShapeNothing),
    Any(ShapeAny),
    Bool(ShapeBool),
    Int(ShapeInt),
    Number(ShapeNumber),
    Text(ShapeText),
    List(ShapeList),
    Record(ShapeRecord),
    Map(ShapeMap),
    Option(ShapeOption),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeNothing {
    pub nothing: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAny {
    pub any: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeBool {
    pub bool: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeInt {
    pub int: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeNumber {
    pub number: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeText {
    pub text: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeList {
    pub list: Box<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub record: IndexMap<String, Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeMap {
    pub map: Box<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeOption {
    pub option: Box<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmptyObject {}

impl Shape {
    pub fn nothing() -> Self {
        Shape::Nothing(ShapeNothing {
            nothing: EmptyObject {},
        })
    }

    pub fn any() -> Self {
        Shape::Any(ShapeAny { any: EmptyObject {} })
    }

    pub fn bool() -> Self {
        Shape::Bool(ShapeBool {
            bool: EmptyObject {},
        })
    }

    pub fn int() -> Self {
        Shape::Int(ShapeInt { int: EmptyObject {} })
    }

    pub fn number() -> Self {
        Shape::Number(ShapeNumber {
            number: EmptyObject {},
        })
    }

    pub fn text() -> Self {
        Shape::Text(ShapeText {
            text: EmptyObject {},
        })
    }

    pub fn list(item: Shape) -> Self {
        Shape::List(ShapeList {
            list: Box::new(item),
        })
    }

    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Shape)>,
        K: Into<String>,
    {
        Shape::Record(ShapeRecord {
            record: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn map(value: Shape) -> Self {
        Shape::Map(ShapeMap {
            map: Box::new(value),
        })
    }

    pub fn option(inner: Shape) -> Self {
        Shape::Option(ShapeOption {
            option: Box::new(inner),
        })
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Shape::Nothing(_))
    }
}

impl From<IndexMap<String, Shape>> for Shape {
    fn from(fields: IndexMap<String, Shape>) -> Self {
        Shape::Record(ShapeRecord { record: fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authoring_format_round_trips() {
        let shape = Shape::record([
            ("a", Shape::number()),
            ("tags", Shape::list(Shape::text())),
            ("note", Shape::option(Shape::text())),
        ]);
        let json = serde_json::to_value(&shape).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "record": {
                    "a": {"number": {}},
                    "tags": {"list": {"text": {}}},
                    "note": {"option": {"text": {}}},
                }
            })
        );
        let back: Shape = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, shape);
    }

    #[test]
    fn nothing_is_distinguishable_from_empty_record() {
        let nothing = serde_json::to_value(Shape::nothing()).expect("serialize");
        let empty = serde_json::to_value(Shape::record::<_, String>([])).expect("serialize");
        assert_ne!(nothing, empty);
        assert!(Shape::nothing().is_nothing());
        assert!(!Shape::record::<_, String>([]).is_nothing());
    }
}
