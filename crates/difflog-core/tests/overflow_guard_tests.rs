#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::manual_log_with;
use difflog_core::history::{DiffRecord, HistoryConfig, DEFAULT_PUBLISH_LIMIT};
use difflog_core::{DiffLogError, ExError, ExErrorKind, HistoryLog};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

#[test]
fn test_default_limit() {
    let log: HistoryLog = HistoryLog::new();
    assert_eq!(log.config().publish_limit, DEFAULT_PUBLISH_LIMIT);
    assert_eq!(DEFAULT_PUBLISH_LIMIT, 100_000);
}

#[test]
fn test_push_past_limit_fails_without_appending() {
    let (log, _clock) = manual_log_with(HistoryConfig::default().with_publish_limit(3));
    for i in 0..3 {
        log.push(&json!({"i": i})).unwrap();
    }
    assert!(!log.is_overflowed());

    let err = log.push(&json!({"i": 3})).unwrap_err();
    assert_eq!(
        err,
        DiffLogError::NotificationOverflow {
            limit: 3,
            generation: 4
        }
    );
    assert_eq!(log.len(), 3);
    assert_eq!(log.current().get("i"), Some(&json!(2)));
    assert!(log.is_overflowed());
}

#[test]
fn test_overflow_is_permanent() {
    let (log, _clock) = manual_log_with(HistoryConfig::default().with_publish_limit(1));
    log.push(&json!({"a": 1})).unwrap();

    for _ in 0..3 {
        let err = log.push(&json!({"a": 2})).unwrap_err();
        assert_eq!(ExError::from(err).kind(), ExErrorKind::NotificationOverflow);
    }
    assert_eq!(log.len(), 1);
    assert_eq!(log.publish_count(), 1);
}

#[test]
fn test_subscribe_replay_does_not_count_as_publish() {
    let (log, _clock) = manual_log_with(HistoryConfig::default().with_publish_limit(2));
    let subs: Vec<_> = (0..5).map(|_| log.subscribe(|_: &[DiffRecord]| {})).collect();
    assert_eq!(log.publish_count(), 0);

    log.push(&json!({"a": 1})).unwrap();
    log.push(&json!({"a": 2})).unwrap();
    assert_eq!(log.publish_count(), 2);
    drop(subs);
}

#[test]
fn test_runaway_reentrant_push_is_stopped() {
    let log: Arc<HistoryLog> = Arc::new(HistoryLog::with_config(
        HistoryConfig::default().with_publish_limit(50),
    ));
    let failures = Arc::new(AtomicUsize::new(0));

    // A subscriber that pushes a new value every time it is notified.
    let weak: Weak<HistoryLog> = Arc::downgrade(&log);
    let failed = failures.clone();
    let _sub = log.subscribe(move |generations: &[DiffRecord]| {
        let Some(log) = weak.upgrade() else {
            return;
        };
        if log.push(&json!({"n": generations.len()})).is_err() {
            failed.fetch_add(1, Ordering::SeqCst);
        }
    });

    // The replay above already started the chain.
    assert!(log.is_overflowed());
    assert_eq!(log.len(), 50);
    assert_eq!(failures.load(Ordering::SeqCst), 1);

    let err = log.push(&json!({"n": "outer"})).unwrap_err();
    assert!(matches!(err, DiffLogError::NotificationOverflow { .. }));
    assert_eq!(log.len(), 50);
}

#[test]
fn test_runaway_chain_stops_at_default_limit() {
    // A small explicit stack: the chain must not deepen it per generation.
    let worker = std::thread::Builder::new()
        .name("runaway-default-limit".into())
        .stack_size(1024 * 1024)
        .spawn(|| {
            let log: Arc<HistoryLog> = Arc::new(HistoryLog::new());
            let failures = Arc::new(AtomicUsize::new(0));

            let weak = Arc::downgrade(&log);
            let failed = failures.clone();
            let _sub = log.subscribe(move |_: &[DiffRecord]| {
                let Some(log) = weak.upgrade() else {
                    return;
                };
                if log.push(&json!({})).is_err() {
                    failed.fetch_add(1, Ordering::SeqCst);
                }
            });

            (
                log.is_overflowed(),
                log.len(),
                log.publish_count(),
                failures.load(Ordering::SeqCst),
                log.push(&json!({"after": true})),
            )
        })
        .unwrap();

    let (overflowed, len, publish_count, failures, later) = worker.join().unwrap();
    assert!(overflowed);
    assert_eq!(len, DEFAULT_PUBLISH_LIMIT as usize);
    assert_eq!(publish_count, DEFAULT_PUBLISH_LIMIT);
    assert_eq!(failures, 1);
    assert_eq!(
        later,
        Err(DiffLogError::NotificationOverflow {
            limit: DEFAULT_PUBLISH_LIMIT,
            generation: DEFAULT_PUBLISH_LIMIT + 1
        })
    );
}

#[test]
fn test_runaway_chain_from_push_returns_overflow() {
    let log: Arc<HistoryLog> = Arc::new(HistoryLog::with_config(
        HistoryConfig::default().with_publish_limit(20),
    ));
    let weak = Arc::downgrade(&log);
    let lengths = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen = lengths.clone();
    let _sub = log.subscribe(move |generations: &[DiffRecord]| {
        seen.lock().push(generations.len());
        // Start pushing only once the caller has pushed.
        if generations.is_empty() {
            return;
        }
        if let Some(log) = weak.upgrade() {
            let _ = log.push(&json!({"n": generations.len()}));
        }
    });

    let err = log.push(&json!({"n": 0})).unwrap_err();
    assert_eq!(
        err,
        DiffLogError::NotificationOverflow {
            limit: 20,
            generation: 21
        }
    );

    // Every recorded generation was published exactly once, in order.
    assert_eq!(log.len(), 20);
    assert_eq!(*lengths.lock(), (0..=20).collect::<Vec<_>>());
    let generations = log.generations();
    for pair in generations.windows(2) {
        assert_eq!(pair[1].before, pair[0].after);
    }
}

#[test]
fn test_nested_push_is_published_after_the_current_round() {
    let log: Arc<HistoryLog> = Arc::new(HistoryLog::new());
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&log);
    let first = order.clone();
    let _echo = log.subscribe(move |generations: &[DiffRecord]| {
        first.lock().push(("echo", generations.len()));
        if generations.len() == 1 {
            if let Some(log) = weak.upgrade() {
                log.push(&json!({"echo": true})).unwrap();
                // Recorded, but not yet handed to subscribers.
                assert_eq!(log.len(), 1);
                assert_eq!(log.current().get("echo"), Some(&json!(true)));
            }
        }
    });
    let second = order.clone();
    let _watch = log.subscribe(move |generations: &[DiffRecord]| {
        second.lock().push(("watch", generations.len()));
    });

    order.lock().clear();
    log.push(&json!({"echo": false})).unwrap();

    assert_eq!(
        *order.lock(),
        vec![("echo", 1), ("watch", 1), ("echo", 2), ("watch", 2)]
    );
}

#[test]
fn test_reentrant_push_sees_consistent_log() {
    let log: Arc<HistoryLog> = Arc::new(HistoryLog::new());
    let weak = Arc::downgrade(&log);
    let _sub = log.subscribe(move |generations: &[DiffRecord]| {
        // Echo once: when the log holds exactly one generation, push a second.
        if generations.len() == 1 {
            if let Some(log) = weak.upgrade() {
                log.push(&json!({"echo": true})).unwrap();
            }
        }
    });

    log.push(&json!({"echo": false})).unwrap();

    let generations = log.generations();
    assert_eq!(generations.len(), 2);
    assert_eq!(generations[1].before, generations[0].after);
    assert_eq!(generations[1].updated.get("echo"), Some(&json!(true)));
}
