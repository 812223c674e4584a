use std::sync::Arc;

use accord_channel::{Channel, ChannelError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::AgreementExpr;
use crate::agreement::Agreement;
use crate::envelope::{CallEnvelope, EnvelopeError, validate_envelope};
use crate::paths::route_path;
use crate::route::Route;

/// Produces the headers for one outgoing call. Invoked fresh on every call;
/// headers may carry per-call tokens or timestamps, so they are never cached.
pub type HeaderSupplier = Arc<dyn Fn() -> Map<String, Value> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("agreement declares no route named '{route}'")]
    UnknownRoute { route: String },
    #[error("outgoing payload rejected: {0}")]
    Payload(#[from] EnvelopeError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("value conversion failed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Build the client side of an agreement: one synthesized call per route,
/// each validating its outgoing payload against the same transfer rules the
/// server enforces, then forwarding over the channel's request primitive.
pub fn proxy(
    channel: Arc<dyn Channel>,
    agreement: &AgreementExpr,
    headers: Option<HeaderSupplier>,
) -> AgreementProxy {
    AgreementProxy {
        channel,
        agreement: agreement.agreement().clone(),
        headers: headers.unwrap_or_else(|| Arc::new(Map::new)),
    }
}

pub struct AgreementProxy {
    channel: Arc<dyn Channel>,
    agreement: Agreement,
    headers: HeaderSupplier,
}

impl AgreementProxy {
    /// The underlying channel, for callers that need to reach past the
    /// contract surface.
    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn agreement(&self) -> &Agreement {
        &self.agreement
    }

    /// Synthesize the standalone callable for one route.
    pub fn bind(&self, name: &str) -> Result<RouteCall, ProxyError> {
        let route = self
            .agreement
            .routes
            .get(name)
            .ok_or_else(|| ProxyError::UnknownRoute { route: name.into() })?;
        Ok(RouteCall {
            channel: self.channel.clone(),
            path: route_path(&self.agreement.role, &self.agreement.version, name),
            route: route.clone(),
            headers: self.headers.clone(),
        })
    }

    pub async fn call(&self, name: &str, params: Option<Value>) -> Result<Value, ProxyError> {
        self.bind(name)?.invoke(params).await
    }

    /// Typed convenience over [`call`](Self::call): serialize the parameter,
    /// deserialize the reply.
    pub async fn call_json<P, R>(&self, name: &str, params: &P) -> Result<R, ProxyError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let reply = self.call(name, Some(params)).await?;
        Ok(serde_json::from_value(reply)?)
    }
}

/// One route's bound call function: mirrors `param -> future<return>` over
/// the wire path both sides compute from `(role, version, name)`.
pub struct RouteCall {
    channel: Arc<dyn Channel>,
    path: String,
    route: Route,
    headers: HeaderSupplier,
}

impl std::fmt::Debug for RouteCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCall")
            .field("path", &self.path)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

impl RouteCall {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn invoke(&self, params: Option<Value>) -> Result<Value, ProxyError> {
        let envelope = CallEnvelope {
            headers: self.route.header.is_some().then(|| (self.headers)()),
            params,
        };
        // Reject locally before anything reaches the wire.
        validate_envelope(&self.route, &envelope)?;
        let payload = serde_json::to_value(&envelope)?;
        Ok(self.channel.request(&self.path, payload).await?)
    }
}
