//! Core types shared across difflog facilities
//!
//! This crate holds the canonical field keys and event names used by the
//! structured logging macros, so that producers and test assertions agree
//! on the same vocabulary.

pub mod schema;
