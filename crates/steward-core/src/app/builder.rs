//! StewardBuilder - ワイヤリングと起動時検証
//!
//! # Fail-fast 設計
//! - 必須のコラボレーター（store, tenants, scheduler, job）が欠けていれば build() で BuildError
//! - clock は省略可（SystemClock）

use std::sync::Arc;

use crate::app::capture::ContextCapture;
use crate::app::config::StewardConfig;
use crate::app::progress::ProgressTracker;
use crate::app::single_flight::SingleFlightGuard;
use crate::app::steward::Steward;
use crate::ports::{
    Clock, IdGenerator, Job, Scheduler, SecurityContextStore, SystemClock, TenantProvider,
    UlidGenerator,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}")]
    Missing(&'static str),
}

/// # 使用例
/// ```ignore
/// let steward = StewardBuilder::new()
///     .context_store(Arc::new(ThreadLocalContextStore::new()))
///     .tenants(Arc::new(FixedTenantProvider::new(TenantId::new("acme"))))
///     .scheduler(scheduler)
///     .job(|progress| CountingJob::new(progress, CountingJobConfig::default()))
///     .build()?;
/// ```
#[derive(Default)]
pub struct StewardBuilder {
    store: Option<Arc<dyn SecurityContextStore>>,
    tenants: Option<Arc<dyn TenantProvider>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    clock: Option<Arc<dyn Clock>>,
    job: Option<Arc<dyn Job>>,
    progress: Arc<ProgressTracker>,
    config: StewardConfig,
}

impl StewardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context_store(mut self, store: Arc<dyn SecurityContextStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn tenants(mut self, tenants: Arc<dyn TenantProvider>) -> Self {
        self.tenants = Some(tenants);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: StewardConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the job. `make` receives the tracker that `Steward::query_progress` reads.
    pub fn job<J, F>(mut self, make: F) -> Self
    where
        J: Job + 'static,
        F: FnOnce(Arc<ProgressTracker>) -> J,
    {
        self.job = Some(Arc::new(make(Arc::clone(&self.progress))));
        self
    }

    pub fn build(self) -> Result<Steward, BuildError> {
        let store = self.store.ok_or(BuildError::Missing("context_store"))?;
        let tenants = self.tenants.ok_or(BuildError::Missing("tenants"))?;
        let scheduler = self.scheduler.ok_or(BuildError::Missing("scheduler"))?;
        let job = self.job.ok_or(BuildError::Missing("job"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(Arc::clone(&clock)));

        Ok(Steward::new(
            job,
            ContextCapture::new(store),
            tenants,
            scheduler,
            clock,
            ids,
            Arc::new(SingleFlightGuard::new()),
            self.progress,
            self.config,
        ))
    }
}
