use accord_types::schema_doc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agreement::Agreement;

/// The portable description of a whole agreement, fit for out-of-band
/// publication and cross-language consumption. A missing schema field means
/// "no constraint declared", never an empty placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementDocument {
    pub role: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub routes: Vec<RouteDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    pub name: String,
    #[serde(default, rename = "paramSchema", skip_serializing_if = "Option::is_none")]
    pub param_schema: Option<Value>,
    #[serde(default, rename = "headerSchema", skip_serializing_if = "Option::is_none")]
    pub header_schema: Option<Value>,
    #[serde(default, rename = "returnSchema", skip_serializing_if = "Option::is_none")]
    pub return_schema: Option<Value>,
}

/// Convert an agreement into its serialized document. Routes appear in
/// declaration order; each declared shape converts independently through
/// [`schema_doc`].
pub fn serialize_agreement(agreement: &Agreement) -> AgreementDocument {
    AgreementDocument {
        role: agreement.role.to_string(),
        version: agreement.version.to_string(),
        description: agreement.description.clone(),
        routes: agreement
            .routes
            .iter()
            .map(|(name, route)| RouteDocument {
                name: name.clone(),
                param_schema: (!route.param.is_nothing()).then(|| schema_doc(&route.param)),
                header_schema: route.header.as_ref().map(schema_doc),
                return_schema: route.ret.as_ref().map(schema_doc),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Route;
    use accord_types::Shape;
    use serde_json::json;

    fn calc() -> Agreement {
        Agreement::new("calc", "1.0.0")
            .expect("agreement")
            .describe("arithmetic over the wire")
            .route(
                "add",
                Route::params(Shape::record([
                    ("a", Shape::number()),
                    ("b", Shape::number()),
                ]))
                .returns(Shape::number()),
            )
            .route("ping", Route::empty())
    }

    #[test]
    fn serialization_is_referentially_stable() {
        let agreement = calc();
        let first = serialize_agreement(&agreement);
        let second = serialize_agreement(&agreement);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("json"),
            serde_json::to_string(&second).expect("json"),
        );
    }

    #[test]
    fn absent_schemas_serialize_to_absent_fields() {
        let document = serialize_agreement(&calc());
        let json = serde_json::to_value(&document).expect("json");
        let ping = &json["routes"][1];
        assert_eq!(ping["name"], json!("ping"));
        assert!(ping.get("paramSchema").is_none());
        assert!(ping.get("headerSchema").is_none());
        assert!(ping.get("returnSchema").is_none());
    }

    #[test]
    fn declared_schemas_appear_as_portable_documents() {
        let document = serialize_agreement(&calc());
        let add = &document.routes[0];
        assert_eq!(add.name, "add");
        assert_eq!(
            add.param_schema.as_ref().expect("param schema")["type"],
            json!("object")
        );
        assert_eq!(
            add.return_schema.as_ref().expect("return schema"),
            &json!({"type": "number"})
        );
        assert!(add.header_schema.is_none());
    }

    #[test]
    fn document_round_trips_through_json() {
        let document = serialize_agreement(&calc());
        let text = serde_json::to_string(&document).expect("encode");
        let back: AgreementDocument = serde_json::from_str(&text).expect("decode");
        assert_eq!(back, document);
    }
}
