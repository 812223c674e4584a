//! Schema-driven contract layer for RPC over a multiplexed channel.
//!
//! An [`Agreement`] declares a named, versioned set of routes; each route
//! carries a parameter shape, optional request headers, and a return shape.
//! [`implement`] walks an agreement and registers a validating dispatcher per
//! implemented route; [`proxy`] synthesizes the mirror-image client calls.
//! [`serialize_agreement`] turns the whole interface into a portable
//! document, which [`enact`] publishes on well-known meta-routes once the
//! server side is bound.

mod agreement;
mod client;
mod describe;
mod envelope;
mod loader;
mod meta;
mod paths;
mod route;
mod server;

pub use agreement::{Agreement, AgreementExpr, AgreementImport};
pub use client::{AgreementProxy, HeaderSupplier, ProxyError, RouteCall, proxy};
pub use describe::{AgreementDocument, RouteDocument, serialize_agreement};
pub use envelope::{CallEnvelope, EnvelopeError, validate_envelope};
pub use loader::{
    AgreementInput, FsResolver, LoadWarning, LoadedAgreement, SourceResolver, load_agreement,
};
pub use meta::{EnactError, MetaRoutePaths, add_meta_routes, enact};
pub use paths::{DEFAULT_DOCUMENT_PATH, DEFAULT_SOURCE_PATH, route_path};
pub use route::{Route, RouteError, Signature};
pub use server::{
    BindError, BindOptions, BindReport, CallContext, CallError, Diagnostic, ImplFn,
    Implementation, Implementations, Validator, implement,
};
