use std::sync::Arc;

use accord_channel::Channel;
use serde_json::Value;
use thiserror::Error;

use crate::loader::LoadedAgreement;
use crate::paths::{DEFAULT_DOCUMENT_PATH, DEFAULT_SOURCE_PATH};
use crate::server::{BindError, BindOptions, BindReport, Implementations, implement};

/// Where the self-description methods are published. Both paths are
/// unversioned and overridable.
#[derive(Debug, Clone)]
pub struct MetaRoutePaths {
    pub document: String,
    pub source: String,
}

impl Default for MetaRoutePaths {
    fn default() -> Self {
        MetaRoutePaths {
            document: DEFAULT_DOCUMENT_PATH.to_string(),
            source: DEFAULT_SOURCE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnactError {
    #[error("agreement failed to load; nothing to bind")]
    NoAgreement,
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Publish an agreement's self-description as two well-known channel
/// methods: the serialized document and the raw source text. Either answers
/// JSON `null` when the corresponding piece is unavailable.
pub fn add_meta_routes(
    channel: &Arc<dyn Channel>,
    loaded: &LoadedAgreement,
    paths: &MetaRoutePaths,
) {
    let document = loaded
        .document
        .as_ref()
        .and_then(|doc| serde_json::to_value(doc).ok())
        .unwrap_or(Value::Null);
    channel.register(
        &paths.document,
        Arc::new(move |_payload| {
            let document = document.clone();
            Box::pin(async move { Ok(document) })
        }),
    );

    let source = loaded.source.clone().map(Value::String).unwrap_or(Value::Null);
    channel.register(
        &paths.source,
        Arc::new(move |_payload| {
            let source = source.clone();
            Box::pin(async move { Ok(source) })
        }),
    );
}

/// Composition entry point: bind the server side, then advertise the
/// agreement. Meta-routes are registered only after the binder succeeds; a
/// partially bound agreement never advertises itself.
pub fn enact(
    channel: &Arc<dyn Channel>,
    loaded: &LoadedAgreement,
    implementations: &Implementations,
    options: &BindOptions,
    paths: &MetaRoutePaths,
) -> Result<BindReport, EnactError> {
    let Some(agreement) = &loaded.agreement else {
        return Err(EnactError::NoAgreement);
    };
    let report = implement(channel, agreement, implementations, options)?;
    add_meta_routes(channel, loaded, paths);
    Ok(report)
}
