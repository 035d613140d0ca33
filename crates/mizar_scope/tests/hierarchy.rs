//! Tests for resource resolution across scope chains.
//!
//! These tests exercise lookups through deeper hierarchies than the unit
//! tests cover:
//! - Shadowing at several depths
//! - Factory materialization into the requesting scope
//! - Multi-name collection with nearest-wins deduplication
//! - Binding resolution along the chain
//! - Sibling isolation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mizar_scope::{LookupError, Scope};

trait Dialer: Send + Sync {
    fn dial(&self) -> String;
}

struct TcpDialer(&'static str);

impl Dialer for TcpDialer {
    fn dial(&self) -> String {
        format!("tcp:{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shadowing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn the_nearest_value_wins_at_every_depth() {
    let root = Scope::new();
    root.add_resource(String::from("root")).unwrap();
    let mid = root.child();
    let leaf = mid.child();

    assert_eq!(*leaf.require_resource::<String>().unwrap(), "root");

    mid.add_resource(String::from("mid")).unwrap();
    assert_eq!(*leaf.require_resource::<String>().unwrap(), "mid");

    leaf.add_resource(String::from("leaf")).unwrap();
    assert_eq!(*leaf.require_resource::<String>().unwrap(), "leaf");
    assert_eq!(*mid.require_resource::<String>().unwrap(), "mid");
    assert_eq!(*root.require_resource::<String>().unwrap(), "root");
}

#[test]
fn siblings_do_not_see_each_other() {
    let root = Scope::new();
    let left = root.child();
    let right = root.child();
    left.add_resource(1u32).unwrap();

    assert!(right.get_resource::<u32>().unwrap().is_none());
    assert!(root.get_resource::<u32>().unwrap().is_none());
}

#[test]
fn trait_objects_resolve_through_the_chain() {
    let root = Scope::new();
    root.add_resource_arc::<dyn Dialer>(Arc::new(TcpDialer("10.0.0.1")))
        .unwrap();
    let leaf = root.child().child();

    let dialer = leaf.require_resource::<dyn Dialer>().unwrap();
    assert_eq!(dialer.dial(), "tcp:10.0.0.1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Factories across the chain
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn each_scope_materializes_its_own_copy_from_a_shared_factory() {
    let calls = Arc::new(AtomicUsize::new(0));
    let root = Scope::new();
    let counted = calls.clone();
    root.add_resource_factory(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        vec![1u8, 2, 3]
    })
    .unwrap();

    let mid = root.child();
    let leaf = mid.child();

    let from_leaf = leaf.require_resource::<Vec<u8>>().unwrap();
    let from_mid = mid.require_resource::<Vec<u8>>().unwrap();
    assert!(!Arc::ptr_eq(&from_leaf, &from_mid));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // The leaf's copy is now a plain value there; no further factory runs.
    let again = leaf.require_resource::<Vec<u8>>().unwrap();
    assert!(Arc::ptr_eq(&from_leaf, &again));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn the_nearest_factory_wins_over_a_farther_one() {
    let root = Scope::new();
    root.add_resource_factory(|_| String::from("far")).unwrap();
    let mid = root.child();
    mid.add_resource_factory(|_| String::from("near")).unwrap();
    let leaf = mid.child();

    assert_eq!(*leaf.require_resource::<String>().unwrap(), "near");
}

#[test]
fn a_factory_reads_resources_visible_to_the_requesting_scope() {
    let root = Scope::new();
    root.add_resource_factory(|scope: &Scope| {
        let base = scope.require_resource::<u32>().unwrap();
        format!("built from {base}")
    })
    .unwrap();
    root.add_resource(1u32).unwrap();
    let leaf = root.child();
    leaf.add_resource(5u32).unwrap();

    // The leaf's shadowing value feeds the factory run for the leaf.
    assert_eq!(*leaf.require_resource::<String>().unwrap(), "built from 5");
    assert_eq!(*root.require_resource::<String>().unwrap(), "built from 1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Collection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_resources_walks_the_whole_chain() {
    let root = Scope::new();
    root.add_resource_named("alpha", 1u32).unwrap();
    root.add_resource_named("beta", 2u32).unwrap();
    let mid = root.child();
    mid.add_resource_named("beta", 20u32).unwrap();
    mid.add_resource_named("gamma", 30u32).unwrap();
    let leaf = mid.child();
    leaf.add_resource_named("gamma", 300u32).unwrap();

    let mut seen: Vec<u32> = leaf
        .get_resources::<u32>()
        .unwrap()
        .iter()
        .map(|v| **v)
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, [1, 20, 300]);
}

#[test]
fn get_resources_includes_factories_under_unclaimed_names() {
    let root = Scope::new();
    root.add_resource_factory_named("lazy", |_| 7u32).unwrap();
    root.add_resource_named("eager", 1u32).unwrap();
    let leaf = root.child();
    leaf.add_resource_named("lazy", 70u32).unwrap();

    let mut seen: Vec<u32> = leaf
        .get_resources::<u32>()
        .unwrap()
        .iter()
        .map(|v| **v)
        .collect();
    seen.sort_unstable();
    // The leaf's own "lazy" value suppresses the root factory of that name.
    assert_eq!(seen, [1, 70]);

    let mut from_root: Vec<u32> = root
        .get_resources::<u32>()
        .unwrap()
        .iter()
        .map(|v| **v)
        .collect();
    from_root.sort_unstable();
    assert_eq!(from_root, [1, 7]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Bindings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bindings_shadow_like_keys_do() {
    let root = Scope::new();
    root.add_resource_bound("default", "store", String::from("root store"))
        .unwrap();
    let mid = root.child();
    let leaf = mid.child();

    assert_eq!(*leaf.resolve::<String>("store").unwrap(), "root store");

    mid.add_resource_bound("default", "store", String::from("mid store"))
        .unwrap();
    assert_eq!(*leaf.resolve::<String>("store").unwrap(), "mid store");
    assert_eq!(*root.resolve::<String>("store").unwrap(), "root store");
}

#[test]
fn a_bound_factory_materializes_into_the_resolver() {
    let calls = Arc::new(AtomicUsize::new(0));
    let root = Scope::new();
    let counted = calls.clone();
    root.add_resource_factory_bound("default", "uplink", move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        TcpDialer("192.168.0.1").dial()
    })
    .unwrap();
    let leaf = root.child().child();

    let first = leaf.resolve::<String>("uplink").unwrap();
    let second = leaf.resolve::<String>("uplink").unwrap();
    assert_eq!(*first, "tcp:192.168.0.1");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // After materialization the leaf also serves the key directly.
    assert_eq!(*leaf.require_resource::<String>().unwrap(), "tcp:192.168.0.1");
}

#[test]
fn unknown_bindings_fail_with_binding_not_found() {
    let leaf = Scope::new().child();
    let error = leaf.resolve::<String>("nowhere").unwrap_err();
    assert!(matches!(error, LookupError::BindingNotFound { .. }));
}
