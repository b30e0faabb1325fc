//! Process-wide key namespace
//!
//! Every proxy instance in a process shares one namespace so that a fleet of
//! cooperating workers agrees on a single keyspace. Key-bearing commands read
//! the namespace at dispatch time, not at proxy construction.
//!
//! Set the namespace once at startup, before any proxy dispatches commands.
//! Changing it mid-run changes which keys subsequent commands touch.

use parking_lot::RwLock;

/// Namespace used when the process never calls [`set_namespace`].
pub const DEFAULT_NAMESPACE: &str = "requeue:";

/// Delimiter every namespace is normalized to end with.
pub const NAMESPACE_DELIMITER: char = ':';

static NAMESPACE: RwLock<Option<String>> = RwLock::new(None);

/// Install the process-wide namespace.
///
/// A missing trailing delimiter is appended: `"myapp"` becomes `"myapp:"`,
/// while `"myapp:"` is stored as-is.
pub fn set_namespace(namespace: impl Into<String>) {
    let mut ns = namespace.into();
    if !ns.ends_with(NAMESPACE_DELIMITER) {
        ns.push(NAMESPACE_DELIMITER);
    }
    *NAMESPACE.write() = Some(ns);
}

/// The namespace currently applied to key-bearing commands.
pub fn namespace() -> String {
    NAMESPACE
        .read()
        .clone()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

/// Remove the current namespace from a key if present.
///
/// Idempotent: a key that does not start with the namespace comes back
/// unchanged. Used to translate raw server key listings back to the logical
/// names callers passed in.
pub fn strip_namespace(key: &str) -> String {
    let ns = namespace();
    key.strip_prefix(ns.as_str()).unwrap_or(key).to_string()
}

/// Clear any installed namespace, falling back to [`DEFAULT_NAMESPACE`].
///
/// Primarily for tests that must not leak a namespace into each other.
pub fn reset_namespace() {
    *NAMESPACE.write() = None;
}
