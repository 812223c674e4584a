use std::sync::Arc;

use accord_channel::{Channel, MethodHandler};
use accord_types::{Shape, ShapeError, validate_value};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::AgreementExpr;
use crate::envelope::{CallEnvelope, EnvelopeError, validate_envelope};
use crate::paths::route_path;
use crate::route::{Route, Signature};

/// Implementation body for one route: takes the decoded parameter value (or
/// `None` for a paramless route), resolves to the raw return value.
pub type ImplFn =
    Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Audit hook run before every implementation: route name, the call's
/// headers, and the call context. Rejection is an `Err`, propagated verbatim
/// to the caller; the implementation never runs for a rejected call.
pub type Validator = Arc<
    dyn Fn(String, Map<String, Value>, CallContext) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
>;

/// Per-call state handed to the validator. Created per inbound call,
/// discarded when the call resolves.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub remote_public_key: String,
    pub params: Option<Value>,
}

/// One route's server-side implementation together with its declared
/// signature, which is checked against the route at bind time.
#[derive(Clone)]
pub struct Implementation {
    signature: Signature,
    func: ImplFn,
}

impl Implementation {
    pub fn new(signature: Signature, func: ImplFn) -> Self {
        Implementation { signature, func }
    }

    /// Wrap a synchronous closure.
    pub fn from_fn(
        signature: Signature,
        func: impl Fn(Option<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let func = Arc::new(func);
        Implementation {
            signature,
            func: Arc::new(move |params| {
                let out = func(params);
                Box::pin(async move { out })
            }),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Route name to implementation table.
#[derive(Clone, Default)]
pub struct Implementations(IndexMap<String, Implementation>);

impl Implementations {
    pub fn new() -> Self {
        Implementations::default()
    }

    pub fn with(mut self, name: impl Into<String>, implementation: Implementation) -> Self {
        self.0.insert(name.into(), implementation);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, implementation: Implementation) {
        self.0.insert(name.into(), implementation);
    }

    pub fn get(&self, name: &str) -> Option<&Implementation> {
        self.0.get(name)
    }
}

#[derive(Clone, Default)]
pub struct BindOptions {
    pub validator: Option<Validator>,
}

impl BindOptions {
    pub fn new() -> Self {
        BindOptions::default()
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Structured diagnostics produced while binding; the host decides how to
/// route them. Warning paths also emit `tracing` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MissingImplementation { route: String },
}

#[derive(Debug, Default)]
pub struct BindReport {
    pub registered: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Contract-definition failures. Fatal at bind time: nothing is registered
/// when any route is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("route '{route}': implementation declares {count} parameters; at most one is supported")]
    MultiParamSignature { route: String, count: usize },
    #[error("route '{route}': implementation parameter does not match the route's param shape")]
    ParamMismatch { route: String },
    #[error("route '{route}': implementation return does not match the route's return shape")]
    ReturnMismatch { route: String },
}

/// Per-call failures inside a bound route. Each fails its own call only.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("malformed call envelope: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid call payload: {0}")]
    Payload(#[from] EnvelopeError),
    #[error("connection exposes no remote identity")]
    MissingIdentity,
    #[error("call rejected")]
    Rejected(#[source] anyhow::Error),
    #[error("implementation returned a value outside the declared return shape: {0}")]
    Return(ShapeError),
}

/// Bind an agreement's server side onto a channel.
///
/// Every implemented route is wrapped in a call adapter that enforces the
/// transfer contract, extracts the caller identity, runs the optional
/// validator, and only then invokes the implementation. Routes without an
/// implementation are skipped with a warning so partial rollouts can bind
/// what they have.
pub fn implement(
    channel: &Arc<dyn Channel>,
    agreement: &AgreementExpr,
    implementations: &Implementations,
    options: &BindOptions,
) -> Result<BindReport, BindError> {
    let agreement = agreement.agreement();
    let mut report = BindReport::default();

    // Check every signature before touching the channel; a malformed route
    // must not leave the agreement half bound.
    let mut accepted: Vec<(&String, &Route, Implementation)> = Vec::new();
    for (name, route) in agreement.routes.iter() {
        let Some(implementation) = implementations.get(name) else {
            warn!(route = %name, "no implementation for route; leaving it unregistered");
            report.diagnostics.push(Diagnostic::MissingImplementation {
                route: name.clone(),
            });
            continue;
        };
        check_signature(name, route, implementation.signature())?;
        accepted.push((name, route, implementation.clone()));
    }

    for (name, route, implementation) in accepted {
        let path = route_path(&agreement.role, &agreement.version, name);
        let handler = call_adapter(
            channel.clone(),
            name.clone(),
            route.clone(),
            implementation,
            options.validator.clone(),
        );
        channel.register(&path, handler);
        report.registered.push(name.clone());
    }

    Ok(report)
}

fn check_signature(name: &str, route: &Route, signature: &Signature) -> Result<(), BindError> {
    match signature.params.as_slice() {
        [] => {
            if !route.param.is_nothing() {
                return Err(BindError::ParamMismatch { route: name.into() });
            }
        }
        [one] => {
            if *one != route.param {
                return Err(BindError::ParamMismatch { route: name.into() });
            }
        }
        many => {
            return Err(BindError::MultiParamSignature {
                route: name.into(),
                count: many.len(),
            });
        }
    }
    if signature.ret != route.ret {
        return Err(BindError::ReturnMismatch { route: name.into() });
    }
    Ok(())
}

fn call_adapter(
    channel: Arc<dyn Channel>,
    name: String,
    route: Route,
    implementation: Implementation,
    validator: Option<Validator>,
) -> MethodHandler {
    Arc::new(move |payload: Value| {
        let channel = channel.clone();
        let name = name.clone();
        let route = route.clone();
        let func = implementation.func.clone();
        let validator = validator.clone();
        Box::pin(async move {
            let envelope: CallEnvelope = if payload.is_null() {
                CallEnvelope::default()
            } else {
                serde_json::from_value(payload).map_err(CallError::Decode)?
            };
            validate_envelope(&route, &envelope).map_err(CallError::Payload)?;

            let headers = envelope.headers.unwrap_or_default();
            let params = normalize_params(&route.param, envelope.params);
            let remote_public_key = channel
                .remote_identity()
                .ok_or(CallError::MissingIdentity)?;

            if let Some(validator) = &validator {
                let context = CallContext {
                    remote_public_key,
                    params: params.clone(),
                };
                validator(name.clone(), headers, context)
                    .await
                    .map_err(CallError::Rejected)?;
            }

            let result = func(params).await?;
            if let Some(ret) = &route.ret {
                validate_value(&result, ret).map_err(CallError::Return)?;
            }
            Ok(result)
        })
    })
}

fn normalize_params(param: &Shape, params: Option<Value>) -> Option<Value> {
    if param.is_nothing() { None } else { params }
}
