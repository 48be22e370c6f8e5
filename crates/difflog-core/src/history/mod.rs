//! Diff-based state history.
//!
//! [`HistoryLog`] keeps the ordered list of [`DiffRecord`]s produced by
//! successive pushes, the latest normalized snapshot, and a registry of
//! subscribers notified after every push.
//!
//! ## Invariants
//!
//! 1. Each successful push appends exactly one record; records are never
//!    rewritten or removed.
//! 2. `asof` never decreases along the log.
//! 3. Callers and subscribers only ever see copies of the log.
//! 4. A failed push leaves the log and the current snapshot untouched.
//! 5. Subscribers are notified in registration order, synchronously.

pub mod clock;
pub mod config;
pub mod log;
pub mod record;
pub mod subscribers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{HistoryConfig, DEFAULT_PUBLISH_LIMIT};
pub use log::HistoryLog;
pub use record::DiffRecord;
pub use subscribers::{Callback, SubscriberId, Subscription};
