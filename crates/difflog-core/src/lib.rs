//! difflog core - diff-based state history tracking
//!
//! This crate records successive snapshots of a structured value and keeps
//! the structural differences between them as an append-only log:
//! - Snapshot normalization with recursively sorted keys
//! - Deterministic structural diffing into added/deleted/updated partitions
//! - An append-only history log with replay-on-subscribe observers
//! - A publish limit guarding against runaway reentrant pushes
//! - Human-readable Markdown summaries of a generation

pub mod diff;
pub mod errors;
pub mod history;
pub mod logging_facility;
pub mod snapshot;

// Re-export commonly used types
pub use diff::{Change, ChangeKind, ChangePath, StructuralDiff};
pub use errors::{DiffLogError, ExError, ExErrorKind, Result};
pub use history::{DiffRecord, HistoryConfig, HistoryLog, Subscription};
pub use snapshot::{normalize, Snapshot};
