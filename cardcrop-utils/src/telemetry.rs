//! Scoped timing logs for the crop pipeline.
//!
//! A [`TimingGuard`] measures the lifetime of a scope and reports it to the
//! [`TELEMETRY_TARGET`] log target when dropped. Guards only arm themselves when
//! telemetry has been switched on through [`configure`] *and* the logger would
//! accept the record, so disabled telemetry costs one atomic load.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use log::{Level, LevelFilter, log, log_enabled};

/// Log target used for every timing record.
pub const TELEMETRY_TARGET: &str = "cardcrop::telemetry";

static ENABLED: AtomicBool = AtomicBool::new(false);
static MAX_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Off as usize);

/// Logs how long a scope took when dropped.
#[must_use = "the guard measures until it is dropped"]
pub struct TimingGuard {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
    armed: bool,
}

impl TimingGuard {
    /// Whether the guard will emit a record on drop.
    pub fn is_active(&self) -> bool {
        self.armed
    }

    /// Stop the guard without logging and return the measured duration.
    pub fn finish(mut self) -> Duration {
        self.armed = false;
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.armed {
            log!(
                target: TELEMETRY_TARGET,
                self.level,
                "{} took {:.2?}",
                self.label,
                self.start.elapsed()
            );
        }
    }
}

/// Start timing `label`, reporting at `level` if telemetry allows it.
pub fn timing_guard(label: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    TimingGuard {
        label: label.into(),
        level,
        start: Instant::now(),
        armed: telemetry_allows(level) && log_enabled!(target: TELEMETRY_TARGET, level),
    }
}

/// Switch telemetry on or off and set the most verbose level it may emit.
pub fn configure(enabled: bool, level: LevelFilter) {
    ENABLED.store(enabled, Ordering::Relaxed);
    MAX_LEVEL.store(level as usize, Ordering::Relaxed);
}

pub fn telemetry_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// The configured telemetry ceiling.
pub fn telemetry_level() -> LevelFilter {
    LevelFilter::iter()
        .nth(MAX_LEVEL.load(Ordering::Relaxed))
        .unwrap_or(LevelFilter::Off)
}

/// `true` when telemetry is on and `level` is within the configured ceiling.
pub fn telemetry_allows(level: Level) -> bool {
    telemetry_enabled() && level <= telemetry_level()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Global state: keep every assertion about it in one test.
    #[test]
    fn configure_controls_level_gate() {
        configure(false, LevelFilter::Trace);
        assert!(!telemetry_allows(Level::Error));
        assert!(!timing_guard("disabled", Level::Error).is_active());

        configure(true, LevelFilter::Info);
        assert_eq!(telemetry_level(), LevelFilter::Info);
        assert!(telemetry_allows(Level::Warn));
        assert!(telemetry_allows(Level::Info));
        assert!(!telemetry_allows(Level::Debug));

        configure(true, LevelFilter::Off);
        assert!(!telemetry_allows(Level::Error));

        configure(false, LevelFilter::Off);
    }

    #[test]
    fn finish_reports_elapsed_time() {
        let guard = timing_guard("finish", Level::Trace);
        std::thread::sleep(Duration::from_millis(2));
        assert!(guard.finish() >= Duration::from_millis(2));
    }
}
