//! Tests for the process-wide namespace and its normalization rules.

mod common;

use common::{lock_namespace, with_namespace};
use requeue_redis::namespace::reset_namespace;
use requeue_redis::{namespace, set_namespace, strip_namespace, DEFAULT_NAMESPACE};

#[test]
fn test_default_namespace_when_unset() {
    let _guard = lock_namespace();
    reset_namespace();
    assert_eq!(namespace(), DEFAULT_NAMESPACE);
    assert_eq!(namespace(), "requeue:");
}

#[test]
fn test_trailing_delimiter_appended() {
    with_namespace("myapp", || {
        assert_eq!(namespace(), "myapp:");
    });
}

#[test]
fn test_existing_delimiter_kept() {
    with_namespace("resque:", || {
        assert_eq!(namespace(), "resque:");
    });
}

#[test]
fn test_interior_delimiters_do_not_count_as_trailing() {
    with_namespace("tenant:7", || {
        assert_eq!(namespace(), "tenant:7:");
    });
}

#[test]
fn test_empty_namespace_normalizes_to_bare_delimiter() {
    with_namespace("", || {
        assert_eq!(namespace(), ":");
    });
}

#[test]
fn test_namespace_is_process_wide() {
    let _guard = lock_namespace();
    set_namespace("shared");
    let seen = std::thread::spawn(namespace).join().unwrap();
    assert_eq!(seen, "shared:");
    reset_namespace();
}

#[test]
fn test_strip_removes_current_namespace() {
    with_namespace("resque:", || {
        assert_eq!(strip_namespace("resque:queue:default"), "queue:default");
    });
}

#[test]
fn test_strip_is_idempotent() {
    with_namespace("resque:", || {
        let once = strip_namespace("resque:job:42");
        let twice = strip_namespace(&once);
        assert_eq!(once, "job:42");
        assert_eq!(twice, "job:42");
    });
}

#[test]
fn test_strip_leaves_foreign_keys_alone() {
    with_namespace("resque:", || {
        assert_eq!(strip_namespace("other:key"), "other:key");
        assert_eq!(strip_namespace("xresque:key"), "xresque:key");
    });
}

#[test]
fn test_strip_tracks_namespace_changes() {
    let _guard = lock_namespace();
    set_namespace("alpha");
    assert_eq!(strip_namespace("alpha:k"), "k");
    set_namespace("beta");
    assert_eq!(strip_namespace("alpha:k"), "alpha:k");
    assert_eq!(strip_namespace("beta:k"), "k");
    reset_namespace();
}
