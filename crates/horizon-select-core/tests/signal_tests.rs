//! Tests for signal delivery and property change detection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_select_core::{Property, Signal};
use parking_lot::Mutex;

#[test]
fn test_slots_run_in_connection_order() {
    let signal = Signal::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let log = log.clone();
        signal.connect(move |value| log.lock().push(format!("{name}:{value}")));
    }
    signal.emit(7);

    assert_eq!(*log.lock(), vec!["first:7", "second:7", "third:7"]);
}

#[test]
fn test_slot_may_connect_during_emit() {
    let signal = Arc::new(Signal::<()>::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let inner_signal = signal.clone();
    let inner_calls = calls.clone();
    signal.connect(move |_| {
        let calls = inner_calls.clone();
        inner_signal.connect(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    });

    // Slots added during an emit only see later emissions.
    signal.emit(());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(signal.connection_count(), 2);

    signal.emit(());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_guard_outliving_signal() {
    let signal = Signal::<i32>::new();
    let guard = signal.connect_scoped(|_| {});
    assert_eq!(signal.connection_count(), 1);
    drop(signal);
    drop(guard);
}

#[test]
fn test_property_shared_between_threads() {
    let property = Arc::new(Property::new(0_usize));
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let property = property.clone();
            std::thread::spawn(move || property.set(n))
        })
        .collect();
    // Every thread writes a value nobody else writes, so every set changes it.
    let changed = handles.into_iter().map(|h| h.join().unwrap()).filter(|c| *c).count();
    assert_eq!(changed, 4);
    assert!((1..=4).contains(&property.get()));
}
