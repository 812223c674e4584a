//! The channel capability an agreement binds to: register a named handler,
//! invoke a named remote method, expose the caller's identity.
//!
//! Transports implement [`Channel`]; everything above it stays transport
//! agnostic. The in-process [`LoopbackChannel`] pair serves tests and
//! embedders that keep both sides in one process.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

mod loopback;

pub use loopback::LoopbackChannel;

/// Handler for one registered method. Takes the raw payload, resolves to the
/// raw response value.
pub type MethodHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("no method registered at '{path}'")]
    MethodNotFound { path: String },
    #[error("remote call to '{path}' failed: {message}")]
    Remote { path: String, message: String },
}

/// One bidirectional multiplexed connection.
///
/// Registration mutates the connection's method table; requests resolve
/// against the peer's. `remote_identity` is the peer's public key when the
/// underlying transport authenticates one.
#[async_trait]
pub trait Channel: Send + Sync {
    fn register(&self, path: &str, handler: MethodHandler);

    async fn request(&self, path: &str, payload: Value) -> Result<Value, ChannelError>;

    fn remote_identity(&self) -> Option<String>;
}
