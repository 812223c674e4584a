use accord_types::{Shape, ShapeError, validate_value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::Route;

/// What actually crosses the wire for one call: optional headers and an
/// optional parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EnvelopeError {
    #[error("route declares no headers but the payload carries them")]
    UnexpectedHeaders,
    #[error("route requires headers")]
    MissingHeaders,
    #[error("headers rejected: {0}")]
    Headers(ShapeError),
    #[error("route accepts no parameters but the payload carries them")]
    UnexpectedParams,
    #[error("route requires parameters")]
    MissingParams,
    #[error("parameters rejected: {0}")]
    Params(ShapeError),
}

/// The transfer check both binders share: headers must match the route's
/// header shape or be absent, params must match the param shape or be
/// absent. Runs before the server defaults missing headers, so a route that
/// declares headers rejects a payload without them.
pub fn validate_envelope(route: &Route, envelope: &CallEnvelope) -> Result<(), EnvelopeError> {
    match (&route.header, &envelope.headers) {
        (None, None) => {}
        (None, Some(_)) => return Err(EnvelopeError::UnexpectedHeaders),
        (Some(_), None) => return Err(EnvelopeError::MissingHeaders),
        (Some(shape), Some(headers)) => {
            validate_value(&Value::Object(headers.clone()), shape)
                .map_err(EnvelopeError::Headers)?;
        }
    }

    match &envelope.params {
        None if route.param.is_nothing() => {}
        None if matches!(route.param, Shape::Option(_)) => {}
        None => return Err(EnvelopeError::MissingParams),
        Some(params) if route.param.is_nothing() => {
            if !params.is_null() {
                return Err(EnvelopeError::UnexpectedParams);
            }
        }
        Some(params) => validate_value(params, &route.param).map_err(EnvelopeError::Params)?,
    }

    Ok(())
}
