//! Integration Tests for the Reactive Engine
//!
//! These tests verify that cells, derivations, and listeners work
//! together correctly: memoization, propagation through diamond-shaped
//! graphs, and deterministic notification order.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use fluid_core::{
    derive, listen, listen_with, priorities, read, val, write, ListenProps, Priority,
};

/// Reading twice with no intervening write returns the same value and
/// computes at most once.
#[test]
fn reads_are_pure_and_memoized() {
    let compute_count = Arc::new(AtomicI32::new(0));
    let compute_clone = compute_count.clone();

    let base = val(21);
    let doubled = derive(&base, move |n: i32| {
        compute_clone.fetch_add(1, Ordering::SeqCst);
        n * 2
    });

    assert_eq!(read(&doubled), 42);
    assert_eq!(read(&doubled), 42);
    assert_eq!(compute_count.load(Ordering::SeqCst), 1);
}

/// After a write, a derivation reads as the function of the new value.
#[test]
fn writes_propagate_to_derivations() {
    let x = val(2);
    let y = derive(&x, |n: i32| n + 100);

    assert_eq!(read(&y), 102);

    write(&x, 5);
    assert_eq!(read(&y), 105);
}

/// Diamond graphs never expose a stale mix of values.
///
/// `xx` depends on `x` both directly and through `upper`; after a write
/// it must read as if both paths saw the new value at once.
#[test]
fn diamond_reads_are_glitch_free() {
    let x = val(String::from("x"));
    let upper = derive(&x, |s: String| s.to_uppercase());
    let xx = derive((&x, &upper), |(a, b): (String, String)| format!("{a}{b}"));

    assert_eq!(read(&xx), "xX");

    write(&x, String::from("a"));
    assert_eq!(read(&xx), "aA");
}

/// A pure write-then-read recomputes a diamond apex once, not once per
/// path.
#[test]
fn diamond_apex_recomputes_once_per_read_cycle() {
    let compute_count = Arc::new(AtomicI32::new(0));
    let compute_clone = compute_count.clone();

    let x = val(1);
    let left = derive(&x, |n: i32| n * 2);
    let right = derive(&x, |n: i32| n * 3);
    let apex = derive((&left, &right), move |(l, r): (i32, i32)| {
        compute_clone.fetch_add(1, Ordering::SeqCst);
        l + r
    });

    assert_eq!(read(&apex), 5);
    assert_eq!(compute_count.load(Ordering::SeqCst), 1);

    write(&x, 10);
    assert_eq!(read(&apex), 50);
    assert_eq!(read(&apex), 50);
    assert_eq!(compute_count.load(Ordering::SeqCst), 2);
}

/// Every value a listener observes during a diamond write is consistent
/// with the written state.
#[test]
fn diamond_listener_never_sees_stale_values() {
    let x = val(String::from("x"));
    let upper = derive(&x, |s: String| s.to_uppercase());
    let xx = derive((&x, &upper), |(a, b): (String, String)| format!("{a}{b}"));

    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = observed.clone();
    let _sub = listen(&xx, move |value: String| {
        observed_clone.lock().unwrap().push(value);
    });

    write(&x, String::from("a"));

    let observed = observed.lock().unwrap();
    assert!(!observed.is_empty());
    for value in observed.iter() {
        assert_eq!(value, "aA");
    }
}

/// A listener fires exactly once per write with the written value, and
/// never again after disposal.
#[test]
fn listener_lifecycle() {
    let x = val(10);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = seen.clone();
    let sub = listen(&x, move |value: i32| {
        seen_clone.lock().unwrap().push(value);
    });

    write(&x, 20);
    assert_eq!(*seen.lock().unwrap(), vec![20]);

    sub.dispose();
    sub.dispose();

    write(&x, 30);
    assert_eq!(*seen.lock().unwrap(), vec![20]);
}

/// Writing either source of a two-source listener fires it once with the
/// sum of current values.
#[test]
fn multi_source_listener_sums_current_values() {
    let x = val(1);
    let y = val(2);
    let sums = Arc::new(Mutex::new(Vec::new()));

    let sums_clone = sums.clone();
    let _sub = listen((&x, &y), move |(a, b): (i32, i32)| {
        sums_clone.lock().unwrap().push(a + b);
    });

    write(&x, 7);
    write(&y, 13);

    assert_eq!(*sums.lock().unwrap(), vec![9, 20]);
}

/// The immediate flag runs the callback during registration, before any
/// write.
#[test]
fn immediate_listener_sees_the_current_value() {
    let x = val(99);
    let seen = Arc::new(AtomicI32::new(0));

    let seen_clone = seen.clone();
    let _sub = listen_with(
        &x,
        move |value: i32| {
            seen_clone.store(value, Ordering::SeqCst);
        },
        ListenProps {
            immediate: true,
            ..ListenProps::default()
        },
    );

    assert_eq!(seen.load(Ordering::SeqCst), 99);
}

/// A single write fires listeners in tier order: lower numbers first,
/// the lowest sentinel after every numeric tier.
#[test]
fn listeners_fire_in_priority_order() {
    let x = val(0);
    let order = Arc::new(Mutex::new(Vec::new()));

    let order_clone = order.clone();
    let _l1 = listen_with(
        &x,
        move |_: i32| order_clone.lock().unwrap().push("priority five"),
        ListenProps {
            priority: Priority::Numeric(5),
            ..ListenProps::default()
        },
    );

    let order_clone = order.clone();
    let _l2 = listen_with(
        &x,
        move |_: i32| order_clone.lock().unwrap().push("priority one"),
        ListenProps {
            priority: Priority::Numeric(1),
            ..ListenProps::default()
        },
    );

    let order_clone = order.clone();
    let _trailing = listen_with(
        &x,
        move |_: i32| order_clone.lock().unwrap().push("lowest"),
        ListenProps {
            priority: priorities::LOWEST,
            ..ListenProps::default()
        },
    );

    write(&x, 1);
    assert_eq!(
        *order.lock().unwrap(),
        vec!["priority one", "priority five", "lowest"]
    );
}

/// `before` splices a listener ahead of an existing tier without
/// renumbering anything.
#[test]
fn spliced_listener_fires_ahead_of_its_anchor() {
    let x = val(0);
    let order = Arc::new(Mutex::new(Vec::new()));

    let order_clone = order.clone();
    let _anchor = listen_with(
        &x,
        move |_: i32| order_clone.lock().unwrap().push("anchor"),
        ListenProps {
            priority: Priority::Numeric(4),
            ..ListenProps::default()
        },
    );

    let order_clone = order.clone();
    let _spliced = listen_with(
        &x,
        move |_: i32| order_clone.lock().unwrap().push("spliced"),
        ListenProps {
            priority: priorities::before(4),
            ..ListenProps::default()
        },
    );

    write(&x, 1);
    assert_eq!(*order.lock().unwrap(), vec!["spliced", "anchor"]);
}

/// Compute-call counting: three reads with one intervening write means
/// exactly two invocations.
#[test]
fn compute_runs_once_per_invalidation_cycle() {
    let compute_count = Arc::new(AtomicI32::new(0));
    let compute_clone = compute_count.clone();

    let x = val(1);
    let y = derive(&x, move |n: i32| {
        compute_clone.fetch_add(1, Ordering::SeqCst);
        n + 1
    });

    assert_eq!(read(&y), 2);
    write(&x, 5);
    assert_eq!(read(&y), 6);
    assert_eq!(read(&y), 6);

    assert_eq!(compute_count.load(Ordering::SeqCst), 2);
}

/// Derivation chains propagate through arbitrary depth.
#[test]
fn deep_chains_recompute_end_to_end() {
    let base = val(0);
    let d1 = derive(&base, |n: i32| n + 1);
    let d2 = derive(&d1, |n: i32| n + 1);
    let d3 = derive(&d2, |n: i32| n + 1);
    let d4 = derive(&d3, |n: i32| n + 1);

    assert_eq!(read(&d4), 4);

    write(&base, 100);
    assert_eq!(read(&d4), 104);
}

/// A listener that writes a different cell triggers full nested
/// propagation before the outer write returns.
#[test]
fn nested_writes_complete_synchronously() {
    let source = val(0);
    let doubled = derive(&source, |n: i32| n * 2);
    let echo = val(0);

    let echo_clone = echo.clone();
    let _forward = listen(&doubled, move |value: i32| {
        echo_clone.set(value);
    });

    let final_values = Arc::new(Mutex::new(Vec::new()));
    let final_clone = final_values.clone();
    let _observe = listen(&echo, move |value: i32| {
        final_clone.lock().unwrap().push(value);
    });

    write(&source, 21);

    assert_eq!(*final_values.lock().unwrap(), vec![42]);
    assert_eq!(read(&echo), 42);
}
