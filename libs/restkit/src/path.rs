//! Route path derivation.
//!
//! Pure functions from resource configuration to final route paths. Paths
//! handed to the router use axum's `{name}` parameter syntax; endpoint
//! definitions may use either `:name` or `{name}` segments.

/// Strip any run of trailing slashes.
pub fn trim_trailing_slashes(s: &str) -> &str {
    s.trim_end_matches('/')
}

/// Base path for a resource: an explicit `path` wins over the
/// `prefix + "/" + name` derivation, regardless of `prefix`.
pub fn base_path(path: Option<&str>, prefix: Option<&str>, resource_name: &str) -> String {
    if let Some(p) = path {
        return trim_trailing_slashes(p).to_string();
    }
    format!(
        "{}/{}",
        trim_trailing_slashes(prefix.unwrap_or("")),
        resource_name
    )
}

/// Resolve an endpoint's relative path against the resource base path.
///
/// An empty relative path yields the base path itself; a path starting with
/// `/` is absolute and returned verbatim (escape hatch for routes that must
/// not live under the base path); anything else is appended.
pub fn endpoint_path(base: &str, rel: &str) -> String {
    let rel = normalize_params(rel);
    if rel.is_empty() {
        return base.to_string();
    }
    if rel.starts_with('/') {
        return rel;
    }
    format!("{base}/{rel}")
}

/// Rewrite `:name` segments into axum's `{name}` syntax.
pub fn normalize_params(path: &str) -> String {
    path.split('/')
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => seg.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parameter names declared in a path, in order of appearance.
/// Accepts both `:name` and `{name}` segments.
pub fn scan_path_params(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|seg| {
            if let Some(name) = seg.strip_prefix(':') {
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
            if let Some(inner) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let inner = inner.trim_start_matches('*');
                if !inner.is_empty() {
                    return Some(inner.to_string());
                }
            }
            None
        })
        .collect()
}
