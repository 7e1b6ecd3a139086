//! Steward - submit / query_progress の窓口
//!
//! `submit()` は即座に受理を返す。実際の admission（実行 or 重複スキップ）は
//! スケジューラー側のスレッドで後から決まるので、呼び出し元には見えない。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::app::capture::ContextCapture;
use crate::app::config::StewardConfig;
use crate::app::envelope::TaskEnvelope;
use crate::app::progress::ProgressTracker;
use crate::app::single_flight::SingleFlightGuard;
use crate::app::status::StewardStatus;
use crate::domain::{RunId, StewardError};
use crate::ports::{Clock, IdGenerator, Job, Scheduler, TenantProvider};

/// Answer to a submission. `accepted` only means "handed to the scheduler".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub accepted: bool,
    pub run_id: RunId,
}

pub struct Steward {
    job: Arc<dyn Job>,
    capture: ContextCapture,
    tenants: Arc<dyn TenantProvider>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    guard: Arc<SingleFlightGuard>,
    progress: Arc<ProgressTracker>,
    config: StewardConfig,
}

impl Steward {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        job: Arc<dyn Job>,
        capture: ContextCapture,
        tenants: Arc<dyn TenantProvider>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        guard: Arc<SingleFlightGuard>,
        progress: Arc<ProgressTracker>,
        config: StewardConfig,
    ) -> Self {
        Self {
            job,
            capture,
            tenants,
            scheduler,
            clock,
            ids,
            guard,
            progress,
            config,
        }
    }

    /// Builds an envelope on the calling thread without scheduling it.
    pub fn envelope(&self) -> Result<TaskEnvelope, StewardError> {
        TaskEnvelope::new(
            self.ids.generate_run_id(),
            Arc::clone(&self.job),
            self.capture.clone(),
            Arc::clone(&self.tenants),
            Arc::clone(&self.guard),
        )
    }

    /// Captures the caller's context and hands a run to the scheduler.
    pub fn submit(&self) -> Result<SubmitReceipt, StewardError> {
        let at = self
            .config
            .schedule_delay()
            .and_then(|delay| self.clock.now().checked_add_signed(delay))
            .ok_or_else(|| {
                StewardError::Schedule(format!(
                    "schedule_delay_ms={} is out of range",
                    self.config.schedule_delay_ms
                ))
            })?;
        let envelope = self.envelope()?;
        let run_id = envelope.run_id();

        tracing::info!(run_id = %run_id, at = %at, "scheduling async job");
        self.scheduler
            .schedule(Box::new(move || envelope.run().map(|_| ())), at)?;

        Ok(SubmitReceipt {
            accepted: true,
            run_id,
        })
    }

    /// Progress of the active run, `None` when idle.
    pub fn query_progress(&self) -> Option<u32> {
        self.progress.read()
    }

    pub fn status(&self) -> StewardStatus {
        StewardStatus {
            active_ticket: self.guard.current().map(|t| t.get()),
            progress: self.progress.read(),
        }
    }

    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    pub fn config(&self) -> &StewardConfig {
        &self.config
    }
}
