use std::path::PathBuf;

use tracing::warn;

use crate::AgreementExpr;
use crate::describe::{AgreementDocument, serialize_agreement};

/// Resolves an agreement location to its raw source text. Injected by the
/// host so the core never touches module resolution or the filesystem on its
/// own.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, location: &str) -> anyhow::Result<String>;
}

/// Resolver over the local filesystem, optionally rooted in a directory.
#[derive(Debug, Default)]
pub struct FsResolver {
    root: Option<PathBuf>,
}

impl FsResolver {
    pub fn new() -> Self {
        FsResolver::default()
    }

    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        FsResolver {
            root: Some(root.into()),
        }
    }
}

impl SourceResolver for FsResolver {
    fn resolve(&self, location: &str) -> anyhow::Result<String> {
        let path = match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        };
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Where an agreement comes from: already materialized, or a location the
/// resolver can fetch.
pub enum AgreementInput {
    Inline(AgreementExpr),
    Located(String),
}

impl From<AgreementExpr> for AgreementInput {
    fn from(expr: AgreementExpr) -> Self {
        AgreementInput::Inline(expr)
    }
}

impl From<crate::Agreement> for AgreementInput {
    fn from(agreement: crate::Agreement) -> Self {
        AgreementInput::Inline(agreement.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub location: String,
    pub reason: String,
}

/// The result of loading an agreement: the agreement itself, its serialized
/// document, and the raw source text when the agreement came from a
/// location. A failed resolve or parse degrades the result instead of
/// failing the load; callers needing strictness check
/// [`is_degraded`](Self::is_degraded) or the warnings.
#[derive(Debug, Default)]
pub struct LoadedAgreement {
    pub agreement: Option<AgreementExpr>,
    pub document: Option<AgreementDocument>,
    pub source: Option<String>,
    pub warnings: Vec<LoadWarning>,
}

impl LoadedAgreement {
    pub fn is_degraded(&self) -> bool {
        self.document.is_none()
    }
}

/// Materialize an agreement and its self-description in one step.
pub fn load_agreement(resolver: &dyn SourceResolver, input: AgreementInput) -> LoadedAgreement {
    let location = match input {
        AgreementInput::Inline(expr) => {
            let document = serialize_agreement(expr.agreement());
            return LoadedAgreement {
                agreement: Some(expr),
                document: Some(document),
                source: None,
                warnings: Vec::new(),
            };
        }
        AgreementInput::Located(location) => location,
    };

    let text = match resolver.resolve(&location) {
        Ok(text) => text,
        Err(err) => {
            warn!(location = %location, error = %err, "agreement source failed to resolve");
            return LoadedAgreement {
                warnings: vec![LoadWarning {
                    location,
                    reason: format!("resolve failed: {err:#}"),
                }],
                ..LoadedAgreement::default()
            };
        }
    };

    match serde_json::from_str::<AgreementExpr>(&text) {
        Ok(expr) => {
            let document = serialize_agreement(expr.agreement());
            LoadedAgreement {
                agreement: Some(expr),
                document: Some(document),
                source: Some(text),
                warnings: Vec::new(),
            }
        }
        Err(err) => {
            warn!(location = %location, error = %err, "agreement source failed to parse");
            LoadedAgreement {
                source: Some(text),
                warnings: vec![LoadWarning {
                    location,
                    reason: format!("parse failed: {err}"),
                }],
                ..LoadedAgreement::default()
            }
        }
    }
}
