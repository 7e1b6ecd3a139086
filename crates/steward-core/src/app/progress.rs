//! ProgressTracker - 実行中タスクの進捗
//!
//! 書き込みは実行中のジョブだけ、読み取りは任意のスレッドから。
//! The active flag and the value share one `AtomicI64`, so a reader can never
//! see "active" paired with a value from a finished run.

use std::sync::atomic::{AtomicI64, Ordering};

const INACTIVE: i64 = -1;

#[derive(Debug)]
pub struct ProgressTracker {
    value: AtomicI64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            value: AtomicI64::new(INACTIVE),
        }
    }

    /// Marks a run active at 0. `finish()` is called when the scope drops.
    #[must_use = "progress is retracted as soon as the scope is dropped"]
    pub fn start(&self) -> ProgressScope<'_> {
        self.value.store(0, Ordering::Release);
        ProgressScope { tracker: self }
    }

    /// Publishes `value`. Ignored when no run is active.
    pub fn update(&self, value: u32) {
        let _ = self.value.fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
            (cur != INACTIVE).then_some(i64::from(value))
        });
    }

    /// `None` when no run is active.
    pub fn read(&self) -> Option<u32> {
        let v = self.value.load(Ordering::Acquire);
        u32::try_from(v).ok()
    }

    pub fn finish(&self) {
        self.value.store(INACTIVE, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.read().is_some()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Active run of a `ProgressTracker`.
pub struct ProgressScope<'a> {
    tracker: &'a ProgressTracker,
}

impl ProgressScope<'_> {
    pub fn update(&self, value: u32) {
        self.tracker.update(value);
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
