//! Token subject resolution.

/// Resolve the meeting token `sub` claim.
///
/// Un-tenanted deployments use the request host. With a tenant path, the
/// deepest non-empty folder name wins: `"/a/b/c/"` resolves to `"c"`.
pub fn resolve_subject(host: &str, tenant_path: Option<&str>) -> String {
    tenant_path
        .and_then(|path| path.split('/').rev().find(|segment| !segment.is_empty()))
        .unwrap_or(host)
        .to_string()
}
