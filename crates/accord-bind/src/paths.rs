use accord_types::{Role, Version};

/// Well-known, unversioned path publishing the serialized agreement document.
pub const DEFAULT_DOCUMENT_PATH: &str = "/_swag.json";

/// Well-known, unversioned path publishing the raw agreement source text.
pub const DEFAULT_SOURCE_PATH: &str = "/_agreement.mjs";

/// The versioned wire path for one contract route. Namespacing by
/// `role@version` lets several versions of one role share a channel, and
/// lets a client pin an exact contract version.
pub fn route_path(role: &Role, version: &Version, name: &str) -> String {
    format!("/agreement/{role}@{version}/{name}")
}
