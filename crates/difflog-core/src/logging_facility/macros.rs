//! Operation logging macros
//!
//! Every operation emits one `start` event and exactly one of `end` or
//! `end_error`, all carrying the canonical `component`, `op` and `event`
//! fields. A `generation = ..` argument is recorded as a `u64`, and
//! `started = <Instant>` stands in for an explicit `duration_ms`.

use std::time::Instant;

/// Milliseconds since `started`, saturating.
#[doc(hidden)]
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr; $($field:tt)*) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($field)*
        )
    };
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use difflog_core::log_op_start;
/// log_op_start!("push");
/// log_op_start!("push", generation = 3);
/// log_op_start!("subscribe", inserted = true);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::__log_op_event!(info, $op, difflog_core_types::schema::EVENT_START;)
    };
    ($op:expr, generation = $generation:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, difflog_core_types::schema::EVENT_START;
            generation = { let generation: u64 = $generation; generation },
            $($($field)*)?
        )
    };
    ($op:expr, $($field:tt)*) => {
        $crate::__log_op_event!(info, $op, difflog_core_types::schema::EVENT_START; $($field)*)
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use difflog_core::log_op_end;
/// let started = std::time::Instant::now();
/// log_op_end!("push", started = started, generation = 3);
/// log_op_end!("push", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, started = $started:expr $(, $($field:tt)*)?) => {
        $crate::log_op_end!(
            $op,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($started)
            $(, $($field)*)?
        )
    };
    ($op:expr, duration_ms = $duration:expr, generation = $generation:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, difflog_core_types::schema::EVENT_END;
            duration_ms = $duration,
            generation = { let generation: u64 = $generation; generation },
            $($($field)*)?
        )
    };
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, difflog_core_types::schema::EVENT_END;
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log an operation error
///
/// The error is converted into an [`ExError`](crate::errors::ExError) so
/// the event always carries a stable `err.code`.
///
/// # Example
///
/// ```
/// # use difflog_core::{log_op_error, errors::DiffLogError};
/// let err = DiffLogError::NonObjectRoot { found: "number".to_string() };
/// log_op_error!("push", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, started = $started:expr $(, $($field:tt)*)?) => {
        $crate::log_op_error!(
            $op,
            $err,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($started)
            $(, $($field)*)?
        )
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(error, $op, difflog_core_types::schema::EVENT_END_ERROR;
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($($field)*)?
        )
    }};
}
