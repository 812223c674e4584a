use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{Channel, ChannelError, MethodHandler};

type MethodTable = Arc<Mutex<HashMap<String, MethodHandler>>>;

/// One end of an in-process bidirectional connection.
///
/// Each end owns its method table; `request` dispatches into the peer's.
/// Built in pairs so both halves of a conversation run in one process.
pub struct LoopbackChannel {
    local: MethodTable,
    peer: MethodTable,
    peer_key: Option<String>,
}

impl LoopbackChannel {
    /// Connect two ends, each authenticated by the given hex key. Either
    /// end's `remote_identity` reports the other end's key.
    pub fn pair(a_key: impl Into<String>, b_key: impl Into<String>) -> (Self, Self) {
        Self::build(Some(a_key.into()), Some(b_key.into()))
    }

    /// Connect two ends over a transport that exposes no identity. Bound
    /// handlers that require a caller identity will fail per call.
    pub fn anonymous_pair() -> (Self, Self) {
        Self::build(None, None)
    }

    fn build(a_key: Option<String>, b_key: Option<String>) -> (Self, Self) {
        let a: MethodTable = Arc::new(Mutex::new(HashMap::new()));
        let b: MethodTable = Arc::new(Mutex::new(HashMap::new()));
        let end_a = LoopbackChannel {
            local: a.clone(),
            peer: b.clone(),
            peer_key: b_key,
        };
        let end_b = LoopbackChannel {
            local: b,
            peer: a,
            peer_key: a_key,
        };
        (end_a, end_b)
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    fn register(&self, path: &str, handler: MethodHandler) {
        self.local.lock().unwrap().insert(path.to_string(), handler);
    }

    async fn request(&self, path: &str, payload: Value) -> Result<Value, ChannelError> {
        let handler = self.peer.lock().unwrap().get(path).cloned();
        let Some(handler) = handler else {
            return Err(ChannelError::MethodNotFound {
                path: path.to_string(),
            });
        };
        handler(payload).await.map_err(|err| ChannelError::Remote {
            path: path.to_string(),
            message: format!("{err:#}"),
        })
    }

    fn remote_identity(&self) -> Option<String> {
        self.peer_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_handler() -> MethodHandler {
        Arc::new(|payload| Box::pin(async move { Ok(payload) }))
    }

    #[tokio::test]
    async fn request_reaches_peer_methods() {
        let (client, server) = LoopbackChannel::pair("aa", "bb");
        server.register("/echo", echo_handler());

        let reply = client.request("/echo", json!({"x": 1})).await.expect("reply");
        assert_eq!(reply, json!({"x": 1}));
    }

    #[tokio::test]
    async fn unknown_method_is_not_found() {
        let (client, _server) = LoopbackChannel::pair("aa", "bb");
        let err = client.request("/missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, ChannelError::MethodNotFound { path } if path == "/missing"));
    }

    #[tokio::test]
    async fn handler_errors_surface_as_remote_failures() {
        let (client, server) = LoopbackChannel::pair("aa", "bb");
        server.register(
            "/boom",
            Arc::new(|_| Box::pin(async { Err(anyhow::anyhow!("nope")) })),
        );

        let err = client.request("/boom", Value::Null).await.unwrap_err();
        assert!(matches!(err, ChannelError::Remote { message, .. } if message.contains("nope")));
    }

    #[tokio::test]
    async fn identity_is_the_peer_key() {
        let (client, server) = LoopbackChannel::pair("aa", "bb");
        assert_eq!(client.remote_identity().as_deref(), Some("bb"));
        assert_eq!(server.remote_identity().as_deref(), Some("aa"));

        let (anon_client, anon_server) = LoopbackChannel::anonymous_pair();
        assert!(anon_client.remote_identity().is_none());
        assert!(anon_server.remote_identity().is_none());
    }
}
