//! TokioScheduler - tokio runtime を executor boundary として使う
//!
//! Each unit waits until its requested time on the runtime, then runs on the
//! blocking pool (`spawn_blocking`), so thread-local context never crosses an
//! `.await`. Failures and panics of a unit are logged here; nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::domain::StewardError;
use crate::ports::{Clock, Scheduler, SystemClock, Unit};

pub struct TokioScheduler {
    handle: Handle,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            clock: Arc::new(SystemClock),
            in_flight: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Scheduler on the runtime of the calling context.
    pub fn current() -> Result<Self, StewardError> {
        let handle = Handle::try_current()
            .map_err(|e| StewardError::Schedule(format!("no tokio runtime: {e}")))?;
        Ok(Self::new(handle))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stop accepting new units. Units already scheduled still run.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Wait until every unit scheduled so far (and any scheduled meanwhile) has finished.
    pub async fn drain(&self) {
        loop {
            let mut set = std::mem::take(&mut *self.lock());
            if set.is_empty() {
                break;
            }
            while let Some(res) = set.join_next().await {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "scheduler task aborted");
                }
            }
        }
    }

    pub async fn shutdown_and_drain(&self) {
        self.close();
        self.drain().await;
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TokioScheduler {
    /// JoinSet の drop はタスクを abort するので、未実行のユニットは runtime に残す
    fn drop(&mut self) {
        self.in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .detach_all();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, unit: Unit, at: DateTime<Utc>) -> Result<(), StewardError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StewardError::Schedule("scheduler is closed".into()));
        }
        // 過去の時刻は「すぐ実行」
        let delay = (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO);

        let mut set = self.lock();
        // 終わったタスクを回収
        while set.try_join_next().is_some() {}

        set.spawn_on(
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match tokio::task::spawn_blocking(unit).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "scheduled unit failed"),
                    Err(e) if e.is_panic() => tracing::error!("scheduled unit panicked"),
                    Err(e) => tracing::warn!(error = %e, "scheduled unit cancelled"),
                }
            },
            &self.handle,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::Instant;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_each_unit_once_off_the_caller_thread() {
        let scheduler = TokioScheduler::current().unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let caller = std::thread::current().id();
        let worker = Arc::new(Mutex::new(None));

        let r = runs.clone();
        let w = worker.clone();
        scheduler
            .schedule(
                Box::new(move || -> Result<(), StewardError> {
                    r.fetch_add(1, Ordering::SeqCst);
                    *w.lock().unwrap() = Some(std::thread::current().id());
                    Ok(())
                }),
                Utc::now(),
            )
            .unwrap();
        scheduler.drain().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let worker = worker.lock().unwrap().unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn waits_until_requested_time() {
        let scheduler = TokioScheduler::current().unwrap();
        let start = Instant::now();
        scheduler
            .schedule(
                Box::new(|| -> Result<(), StewardError> { Ok(()) }),
                Utc::now() + chrono::Duration::milliseconds(150),
            )
            .unwrap();
        scheduler.drain().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failing_and_panicking_units_do_not_poison_the_scheduler() {
        let scheduler = TokioScheduler::current().unwrap();
        scheduler
            .schedule(
                Box::new(|| -> Result<(), StewardError> { Err(StewardError::job("t", "boom")) }),
                Utc::now(),
            )
            .unwrap();
        scheduler
            .schedule(
                Box::new(|| -> Result<(), StewardError> { panic!("boom") }),
                Utc::now(),
            )
            .unwrap();
        scheduler.drain().await;

        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        scheduler
            .schedule(
                Box::new(move || -> Result<(), StewardError> {
                    r.store(true, Ordering::SeqCst);
                    Ok(())
                }),
                Utc::now(),
            )
            .unwrap();
        scheduler.drain().await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn delayed_unit_still_runs_after_scheduler_is_dropped() {
        let ran = Arc::new(AtomicBool::new(false));
        {
            let scheduler = TokioScheduler::current().unwrap();
            let r = ran.clone();
            scheduler
                .schedule(
                    Box::new(move || -> Result<(), StewardError> {
                        r.store(true, Ordering::SeqCst);
                        Ok(())
                    }),
                    Utc::now() + chrono::Duration::milliseconds(50),
                )
                .unwrap();
        }
        assert!(!ran.load(Ordering::SeqCst));

        let deadline = Instant::now() + Duration::from_secs(2);
        while !ran.load(Ordering::SeqCst) && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn closed_scheduler_rejects_units() {
        let scheduler = TokioScheduler::current().unwrap();
        scheduler.shutdown_and_drain().await;
        let err = scheduler
            .schedule(Box::new(|| -> Result<(), StewardError> { Ok(()) }), Utc::now())
            .unwrap_err();
        assert!(matches!(err, StewardError::Schedule(_)));
    }
}
