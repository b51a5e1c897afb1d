//! `${VAR}` environment references in configuration values

/// Name of the variable referenced by a whole-value `${VAR}` string
pub fn env_reference(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Resolve a `${VAR}` reference, falling back to an empty string when unset.
/// Values that are not references are returned unchanged.
pub fn resolve_or_empty(value: &str) -> String {
    match env_reference(value) {
        Some(var) => std::env::var(var).unwrap_or_default(),
        None => value.to_string(),
    }
}

/// Resolve a `${VAR}` reference, keeping the original text when unset.
pub fn resolve_or_keep(value: &str) -> String {
    match env_reference(value) {
        Some(var) => std::env::var(var).unwrap_or_else(|_| value.to_string()),
        None => value.to_string(),
    }
}
