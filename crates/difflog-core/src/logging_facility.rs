//! Structured logging facility for difflog
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use difflog_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! # Logging Macros
//!
//! - `log_op_start!(op, generation = .., ...)` - Log operation start
//! - `log_op_end!(op, started = instant, generation = .., ...)` - Log operation end
//! - `log_op_error!(op, err, started = instant, ...)` - Log operation error
//!
//! `started = instant` may be replaced by an explicit `duration_ms = ..`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
