//! Structural snapshot diff.
//!
//! Compares two normalized snapshots and partitions every difference into
//! added, deleted and updated leaf paths.
//!
//! ## Entry points
//!
//! ```ignore
//! use difflog_core::diff::{compute_changes, compute_diff, render_human_summary};
//!
//! let diff = compute_diff(&before, &after);
//! let summary = render_human_summary(&compute_changes(&before, &after));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical change lists and trees.
//! - **Disjoint partitions**: a leaf path is reported under exactly one kind.
//! - **Order-insensitivity**: snapshots are key-sorted, so key insertion
//!   order never produces a change.

pub mod engine;
pub mod human_summary;
pub mod model;
pub mod path;

pub use engine::{compute_changes, compute_diff};
pub use human_summary::render_human_summary;
pub use model::{Change, ChangeKind, StructuralDiff};
pub use path::ChangePath;
