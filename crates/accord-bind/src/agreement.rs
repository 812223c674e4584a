use accord_types::{RefError, Role, Version};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Route;

/// A named, versioned set of routes. Valid by construction: the role and
/// version newtypes reject malformed values, and map semantics keep route
/// names unique. Insertion order is preserved for stable serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub role: Role,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub routes: IndexMap<String, Route>,
}

impl Agreement {
    pub fn new(role: &str, version: &str) -> Result<Self, RefError> {
        Ok(Agreement {
            role: Role::new(role)?,
            version: Version::new(version)?,
            description: None,
            routes: IndexMap::new(),
        })
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn route(mut self, name: impl Into<String>, route: Route) -> Self {
        self.routes.insert(name.into(), route);
        self
    }
}

/// An agreement given directly or through an import wrapper; both binders
/// normalize to the inner agreement before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgreementExpr {
    Import(AgreementImport),
    Inline(Agreement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementImport {
    pub import: Agreement,
}

impl AgreementExpr {
    pub fn agreement(&self) -> &Agreement {
        match self {
            AgreementExpr::Import(wrapper) => &wrapper.import,
            AgreementExpr::Inline(agreement) => agreement,
        }
    }
}

impl From<Agreement> for AgreementExpr {
    fn from(agreement: Agreement) -> Self {
        AgreementExpr::Inline(agreement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::Shape;
    use serde_json::json;

    #[test]
    fn import_wrapper_normalizes_to_the_inner_agreement() {
        let agreement = Agreement::new("calc", "1.0.0").expect("agreement");
        let wrapped = AgreementExpr::Import(AgreementImport {
            import: agreement.clone(),
        });
        assert_eq!(wrapped.agreement(), &agreement);
        let inline = AgreementExpr::from(agreement.clone());
        assert_eq!(inline.agreement(), &agreement);
    }

    #[test]
    fn parses_both_expression_forms() {
        let inline = json!({
            "role": "calc",
            "version": "1.0.0",
            "routes": {"ping": {}},
        });
        let expr: AgreementExpr = serde_json::from_value(inline).expect("inline");
        assert_eq!(expr.agreement().role.as_str(), "calc");

        let imported = json!({
            "import": {"role": "calc", "version": "1.0.0", "routes": {}},
        });
        let expr: AgreementExpr = serde_json::from_value(imported).expect("import");
        assert!(matches!(expr, AgreementExpr::Import(_)));
    }

    #[test]
    fn malformed_role_or_version_fails_to_parse() {
        let bad_version = json!({"role": "calc", "version": "one", "routes": {}});
        assert!(serde_json::from_value::<Agreement>(bad_version).is_err());
        let bad_role = json!({"role": "", "version": "1.0.0", "routes": {}});
        assert!(serde_json::from_value::<Agreement>(bad_role).is_err());
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let forward = json!({
            "role": "calc",
            "version": "1.0.0",
            "routes": {},
            "future_field": {"anything": true},
        });
        assert!(serde_json::from_value::<Agreement>(forward).is_ok());
    }

    #[test]
    fn route_order_is_preserved() {
        let agreement = Agreement::new("calc", "1.0.0")
            .expect("agreement")
            .route("sub", Route::params(Shape::record([("a", Shape::number())])))
            .route("add", Route::empty());
        let names: Vec<&str> = agreement.routes.keys().map(String::as_str).collect();
        assert_eq!(names, ["sub", "add"]);
    }
}
