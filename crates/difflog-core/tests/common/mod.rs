use chrono::{DateTime, TimeZone, Utc};
use difflog_core::history::{DiffRecord, HistoryConfig, ManualClock};
use difflog_core::HistoryLog;
use parking_lot::Mutex;
use std::sync::Arc;

/// Fixed starting instant for deterministic timestamps
#[allow(dead_code)]
pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Create a log driven by a manual clock set to [`fixed_start`]
///
/// Returns the clock too so tests can move time around.
#[allow(dead_code)]
pub fn manual_log() -> (HistoryLog, Arc<ManualClock>) {
    manual_log_with(HistoryConfig::default())
}

#[allow(dead_code)]
pub fn manual_log_with(config: HistoryConfig) -> (HistoryLog, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(fixed_start()));
    let log = HistoryLog::with_config(config).with_clock(clock.clone());
    (log, clock)
}

/// A callback that records the length of every log it is handed
#[allow(dead_code)]
pub fn recorder() -> (
    Arc<Mutex<Vec<usize>>>,
    impl Fn(&[DiffRecord]) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |generations: &[DiffRecord]| {
        sink.lock().push(generations.len())
    })
}
