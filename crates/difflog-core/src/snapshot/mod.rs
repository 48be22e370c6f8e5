//! Snapshot normalization.
//!
//! Turns any serializable value into a [`Snapshot`]: a plain JSON object
//! whose mappings are key-sorted at every level and which shares no state
//! with the caller's value.
//!
//! ## Guarantees
//!
//! - **Order-insensitivity**: structurally equal inputs normalize to
//!   byte-identical canonical JSON regardless of key insertion order.
//! - **Idempotence**: normalizing a snapshot yields the same snapshot.
//! - **Independence**: the result is a fresh value; nothing aliases the input.

pub mod normalize;

pub use normalize::{normalize, Snapshot, MAX_DEPTH};
