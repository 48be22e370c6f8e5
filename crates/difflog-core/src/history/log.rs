//! The append-only history log.

use crate::errors::{DiffLogError, Result};
use crate::history::clock::{Clock, SystemClock};
use crate::history::config::HistoryConfig;
use crate::history::record::DiffRecord;
use crate::history::subscribers::{Callback, Registry, Subscription};
use crate::snapshot::{normalize, Snapshot};
use crate::{log_op_end, log_op_error, log_op_start};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

struct LogState {
    previous: Snapshot,
    last_asof: Option<DateTime<Utc>>,
    /// Recorded but not yet published, oldest first
    pending: VecDeque<DiffRecord>,
    publish_count: u64,
    overflowed: bool,
    /// Set while the outermost push on the cycle-owning thread drains `pending`
    publishing: bool,
}

/// Records successive snapshots of a value as an append-only list of diffs
/// and notifies subscribers after every push.
///
/// A log is `Send + Sync` and is usually shared behind an `Arc`. Each
/// push/publish cycle runs under a per-instance reentrant lock: pushes from
/// different threads are serialized end to end, while a subscriber may push
/// again from inside its callback on the same thread.
///
/// Such a nested push records its generation and returns straight away; the
/// outermost push publishes it after the current notification round, one
/// generation at a time. Stack depth therefore stays constant however long
/// a push-from-callback chain runs, and the chain ends when
/// [`HistoryConfig::publish_limit`] is reached.
///
/// # Example
///
/// ```
/// use difflog_core::HistoryLog;
/// use serde_json::json;
///
/// let log = HistoryLog::new();
/// log.push(&json!({"count": 1})).unwrap();
/// log.push(&json!({"count": 2, "label": "a"})).unwrap();
///
/// let generations = log.generations();
/// assert_eq!(generations.len(), 2);
/// assert_eq!(generations[1].added.get("label"), Some(&json!("a")));
/// assert_eq!(generations[1].updated.get("count"), Some(&json!(2)));
/// ```
pub struct HistoryLog<T: ?Sized = Value> {
    config: HistoryConfig,
    clock: Arc<dyn Clock>,
    cycle: ReentrantMutex<()>,
    state: Mutex<LogState>,
    /// Published generations. Read-locked for the duration of a notification
    /// round so subscribers borrow the log instead of copying it.
    records: RwLock<Vec<DiffRecord>>,
    subscribers: Arc<Mutex<Registry>>,
    _value: PhantomData<fn(&T)>,
}

impl<T: ?Sized> HistoryLog<T> {
    /// Create an empty log with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create an empty log with explicit configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            cycle: ReentrantMutex::new(()),
            state: Mutex::new(LogState {
                previous: Snapshot::empty(),
                last_asof: None,
                pending: VecDeque::new(),
                publish_count: 0,
                overflowed: false,
                publishing: false,
            }),
            records: RwLock::new(Vec::new()),
            subscribers: Arc::new(Mutex::new(Registry::default())),
            _value: PhantomData,
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // Subscribers read the log while a notification round holds a read
    // guard, hence the recursive reads below.

    /// A copy of every published generation, oldest first.
    pub fn generations(&self) -> Vec<DiffRecord> {
        self.records.read_recursive().clone()
    }

    /// Number of published generations.
    pub fn len(&self) -> usize {
        self.records.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read_recursive().is_empty()
    }

    /// The most recent published generation, if any.
    pub fn latest(&self) -> Option<DiffRecord> {
        self.records.read_recursive().last().cloned()
    }

    /// The most recently pushed normalized snapshot (empty before the
    /// first push).
    ///
    /// Inside a callback this already reflects a nested push whose
    /// generation has not been published yet.
    pub fn current(&self) -> Snapshot {
        self.state.lock().previous.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Generations recorded so far; each one owes exactly one publish cycle.
    pub fn publish_count(&self) -> u64 {
        self.state.lock().publish_count
    }

    /// Whether the publish limit has been hit. Once set it never clears.
    pub fn is_overflowed(&self) -> bool {
        self.state.lock().overflowed
    }

    /// Register a callback and replay the current log to it.
    ///
    /// Every call creates a new entry, even for behaviourally identical
    /// closures. Use [`subscribe_shared`](Self::subscribe_shared) to
    /// register one callback from several places without duplicates.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[DiffRecord]) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(callback))
    }

    /// Register a shared callback and replay the current log to it.
    ///
    /// Subscribing the same `Arc` allocation again does not add a second
    /// entry; the returned handle refers to the existing one. The replay
    /// happens either way.
    pub fn subscribe_shared(&self, callback: Arc<Callback>) -> Subscription {
        let _cycle = self.cycle.lock();
        let (id, inserted) = self.subscribers.lock().insert(callback.clone());
        tracing::debug!(
            component = module_path!(),
            op = "subscribe",
            subscriber_id = id.as_u64(),
            inserted,
            "subscriber registered"
        );

        // Pushes made from the replay are queued like those made from a
        // notification, then published below.
        let nested = {
            let guard = PublishingGuard::enter(&self.state);
            let records = self.records.read_recursive();
            callback(&records);
            guard.previous
        };
        if !nested {
            self.drain();
        }

        Subscription::new(id, &self.subscribers)
    }

    /// Publish pending generations one at a time until none are left.
    ///
    /// Only the outermost push runs this; callbacks that push again only
    /// add to `pending`, which this loop picks up on its next turn.
    fn drain(&self) {
        let _round = PublishingGuard::enter(&self.state);
        loop {
            let Some(record) = self.state.lock().pending.pop_front() else {
                break;
            };
            self.records.write().push(record);
            self.publish();
        }
    }

    /// Notify every current subscriber with the published log.
    fn publish(&self) {
        let callbacks = self.subscribers.lock().callbacks();
        if callbacks.is_empty() {
            return;
        }
        let records = self.records.read_recursive();
        for callback in callbacks {
            callback(&records);
        }
    }
}

/// Marks a notification round in progress and restores the previous flag
/// on drop, including when a subscriber panics.
struct PublishingGuard<'a> {
    state: &'a Mutex<LogState>,
    previous: bool,
}

impl<'a> PublishingGuard<'a> {
    fn enter(state: &'a Mutex<LogState>) -> Self {
        let previous = std::mem::replace(&mut state.lock().publishing, true);
        Self { state, previous }
    }
}

impl Drop for PublishingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().publishing = self.previous;
    }
}

impl<T: Serialize + ?Sized> HistoryLog<T> {
    /// Record a new snapshot of `value` and notify subscribers.
    ///
    /// Appends exactly one [`DiffRecord`] on success. The first push diffs
    /// against the empty mapping, so every top-level key lands in `added`.
    /// All subscribers present when publishing starts are called before
    /// the outermost push returns; a push made from inside a callback is
    /// published right after the current notification round.
    ///
    /// # Errors
    ///
    /// - `Serialization` / `NonObjectRoot` / `DepthLimitExceeded` - `value`
    ///   cannot be normalized; the log is unchanged
    /// - `NotificationOverflow` - the publish limit is reached; nothing is
    ///   appended, and every later push fails the same way. When the limit
    ///   is hit by a push made from a callback, the outermost push returns
    ///   this error too, after every recorded generation has been published.
    ///
    /// A panicking subscriber unwinds out of `push`; the record stays
    /// appended and the remaining subscribers of that cycle are skipped.
    pub fn push(&self, value: &T) -> Result<()> {
        let started = Instant::now();
        let _cycle = self.cycle.lock();
        let generation = self.state.lock().publish_count + 1;
        log_op_start!("push", generation = generation);

        let nested = match self.record(value, generation) {
            Ok(nested) => nested,
            Err(err) => {
                log_op_error!("push", err.clone(), started = started, generation = generation);
                return Err(err);
            }
        };
        if nested {
            log_op_end!("push", started = started, generation = generation, nested = true);
            return Ok(());
        }

        self.drain();

        // Only a push made during this drain can have tripped the guard;
        // had it been set before, `record` would have failed above.
        let overflow = {
            let state = self.state.lock();
            state
                .overflowed
                .then(|| DiffLogError::NotificationOverflow {
                    limit: self.config.publish_limit,
                    generation: state.publish_count + 1,
                })
        };
        if let Some(err) = overflow {
            log_op_error!("push", err.clone(), started = started, generation = generation);
            return Err(err);
        }

        log_op_end!("push", started = started, generation = generation);
        Ok(())
    }

    /// Normalize, diff and queue under the state lock.
    ///
    /// Returns whether a notification round is already running on this
    /// thread, in which case that round's owner publishes the record.
    fn record(&self, value: &T, generation: u64) -> Result<bool> {
        let mut state = self.state.lock();

        if state.publish_count >= self.config.publish_limit {
            state.overflowed = true;
            tracing::warn!(
                component = module_path!(),
                op = "publish",
                publish_count = state.publish_count,
                limit = self.config.publish_limit,
                "history published too many times"
            );
            return Err(DiffLogError::NotificationOverflow {
                limit: self.config.publish_limit,
                generation,
            });
        }

        let before = normalize(&state.previous)?;
        let after = normalize(value)?;

        let now = self.clock.now();
        let asof = state.last_asof.map_or(now, |last| now.max(last));

        let record = DiffRecord::new(before, after.clone(), asof);
        tracing::debug!(
            component = module_path!(),
            op = "push",
            generation,
            added = record.added.len(),
            deleted = record.deleted.len(),
            updated = record.updated.len(),
            "generation recorded"
        );

        state.pending.push_back(record);
        state.previous = after;
        state.last_asof = Some(asof);
        state.publish_count = generation;
        Ok(state.publishing)
    }
}

impl<T: ?Sized> Default for HistoryLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for HistoryLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HistoryLog")
            .field("generations", &self.records.read_recursive().len())
            .field("pending", &state.pending.len())
            .field("publish_count", &state.publish_count)
            .field("overflowed", &state.overflowed)
            .field("subscribers", &self.subscribers.lock().len())
            .field("config", &self.config)
            .finish()
    }
}
