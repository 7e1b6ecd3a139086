//! Scheduler port - executor boundary
//!
//! 「あとで、どこかのスレッドで一度だけ実行する」サービス。
//! スレッドの対応関係や実行順序は保証しない。

use chrono::{DateTime, Utc};

use crate::domain::StewardError;

/// A unit of work handed to the scheduler. Its error is the scheduler's to dispose of.
pub type Unit = Box<dyn FnOnce() -> Result<(), StewardError> + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Runs `unit` exactly once, on some thread, at or after `at`.
    fn schedule(&self, unit: Unit, at: DateTime<Utc>) -> Result<(), StewardError>;
}
