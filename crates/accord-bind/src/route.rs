use accord_types::Shape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("signature declares {count} parameters; a route accepts at most one")]
    MultiParam { count: usize },
}

/// One operation's schema triple. `param` is always present and defaults to
/// the accepts-nothing shape; `header` and `ret` stay absent until declared,
/// which is distinct from a present-but-empty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default = "Shape::nothing")]
    pub param: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "return")]
    pub ret: Option<Shape>,
}

impl Route {
    /// A route that takes nothing, returns nothing, and carries no headers.
    pub fn empty() -> Self {
        Route {
            param: Shape::nothing(),
            header: None,
            ret: None,
        }
    }

    pub fn params(param: impl Into<Shape>) -> Self {
        Route {
            param: param.into(),
            ..Route::empty()
        }
    }

    pub fn returns(mut self, shape: impl Into<Shape>) -> Self {
        self.ret = Some(shape.into());
        self
    }

    pub fn headers(mut self, shape: impl Into<Shape>) -> Self {
        self.header = Some(shape.into());
        self
    }

    /// Derive a route from a typed call signature. At most one positional
    /// parameter is supported; zero parameters mean the route takes nothing.
    pub fn from_signature(signature: &Signature) -> Result<Self, RouteError> {
        let param = match signature.params.as_slice() {
            [] => Shape::nothing(),
            [one] => one.clone(),
            many => {
                return Err(RouteError::MultiParam { count: many.len() });
            }
        };
        Ok(Route {
            param,
            header: None,
            ret: signature.ret.clone(),
        })
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::empty()
    }
}

/// A callable's declared shape: positional parameters and an optional
/// return. Feeds [`Route::from_signature`] and the server binder's
/// implementation-versus-route check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "return")]
    pub ret: Option<Shape>,
}

impl Signature {
    pub fn new() -> Self {
        Signature::default()
    }

    pub fn param(mut self, shape: impl Into<Shape>) -> Self {
        self.params.push(shape.into());
        self
    }

    pub fn returns(mut self, shape: impl Into<Shape>) -> Self {
        self.ret = Some(shape.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn builder_returns_new_values() {
        let base = Route::params(Shape::record([("a", Shape::number())]));
        let with_return = base.clone().returns(Shape::number());
        assert!(base.ret.is_none());
        assert_eq!(with_return.ret, Some(Shape::number()));
        assert_eq!(with_return.param, base.param);
    }

    #[test]
    fn header_mapping_normalizes_to_record() {
        let fields = IndexMap::from([("token".to_string(), Shape::text())]);
        let route = Route::empty().headers(fields);
        assert_eq!(
            route.header,
            Some(Shape::record([("token", Shape::text())]))
        );
    }

    #[test]
    fn empty_route_accepts_nothing() {
        let route = Route::empty();
        assert!(route.param.is_nothing());
        assert!(route.header.is_none());
        assert!(route.ret.is_none());
    }

    #[test]
    fn signature_with_one_param_becomes_the_param_shape() {
        let signature = Signature::new()
            .param(Shape::record([("a", Shape::number())]))
            .returns(Shape::number());
        let route = Route::from_signature(&signature).expect("route");
        assert_eq!(route.param, Shape::record([("a", Shape::number())]));
        assert_eq!(route.ret, Some(Shape::number()));
    }

    #[test]
    fn signature_with_no_params_accepts_nothing() {
        let route = Route::from_signature(&Signature::new()).expect("route");
        assert!(route.param.is_nothing());
        assert!(route.ret.is_none());
    }

    #[test]
    fn multi_param_signature_is_fatal() {
        let signature = Signature::new().param(Shape::int()).param(Shape::int());
        let err = Route::from_signature(&signature).unwrap_err();
        assert_eq!(err, RouteError::MultiParam { count: 2 });
    }

    #[test]
    fn route_json_defaults_param_to_nothing() {
        let route: Route = serde_json::from_str("{}").expect("route");
        assert!(route.param.is_nothing());
        let json = serde_json::to_value(Route::empty()).expect("json");
        assert_eq!(json, serde_json::json!({"param": {"nothing": {}}}));
    }
}
