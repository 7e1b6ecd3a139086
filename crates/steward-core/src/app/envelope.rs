//! TaskEnvelope - 投入スレッドのコンテキストを運ぶ実行単位
//!
//! Created on the submitting thread, run later on a worker thread:
//!
//! 1. take the single-flight slot, or give up (`Rejected`) without touching anything
//! 2. install the captured context
//! 3. run the job as the captured tenant
//! 4. clear the context and release the slot, on every exit path
//!
//! Step 4 is carried by `ContextScope` and `Admission` drop guards, so an
//! error or a panic in the job cannot skip it.

use std::sync::Arc;

use crate::app::capture::ContextCapture;
use crate::app::single_flight::{SingleFlightGuard, Ticket};
use crate::domain::{ContextSnapshot, EnvelopeState, RunId, StewardError, TenantId};
use crate::ports::{Job, TenantProvider};

pub struct TaskEnvelope {
    run_id: RunId,
    ticket: Ticket,
    tenant_id: TenantId,
    snapshot: ContextSnapshot,
    job: Arc<dyn Job>,
    capture: ContextCapture,
    tenants: Arc<dyn TenantProvider>,
    guard: Arc<SingleFlightGuard>,
    state: EnvelopeState,
}

impl TaskEnvelope {
    /// Captures tenant and context from the calling thread.
    pub fn new(
        run_id: RunId,
        job: Arc<dyn Job>,
        capture: ContextCapture,
        tenants: Arc<dyn TenantProvider>,
        guard: Arc<SingleFlightGuard>,
    ) -> Result<Self, StewardError> {
        let tenant_id = tenants.current_tenant_id();
        let snapshot = capture.capture()?;
        let ticket = guard.issue();

        tracing::info!(
            run_id = %run_id,
            ticket = %ticket,
            tenant = %tenant_id,
            principal = ?snapshot.principal(),
            job = job.name(),
            "created job envelope"
        );

        Ok(Self {
            run_id,
            ticket,
            tenant_id,
            snapshot,
            job,
            capture,
            tenants,
            guard,
            state: EnvelopeState::Created,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn snapshot(&self) -> &ContextSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Runs the envelope on the current thread.
    ///
    /// Returns `Ok(Rejected)` when another run holds the slot. A job failure is
    /// returned only after the slot has been released and the context cleared.
    pub fn run(mut self) -> Result<EnvelopeState, StewardError> {
        let guard = Arc::clone(&self.guard);
        let Some(_admission) = guard.admit(self.ticket) else {
            self.transition(EnvelopeState::Rejected);
            tracing::warn!(
                run_id = %self.run_id,
                ticket = %self.ticket,
                active = ?guard.current().map(Ticket::get),
                "duplicate job invocation, skipping task"
            );
            return Ok(self.state);
        };
        self.transition(EnvelopeState::Admitted);

        // drop 順: _context（clear）→ _admission（release）
        let _context = self.capture.install(&self.snapshot);
        self.transition(EnvelopeState::Running);

        tracing::info!(
            run_id = %self.run_id,
            tenant = %self.tenant_id,
            principal = ?self.snapshot.principal(),
            job = self.job.name(),
            "executing job on behalf of tenant"
        );

        let job = Arc::clone(&self.job);
        let result = self.tenants.run_as(&self.tenant_id, &mut || job.run());
        self.transition(EnvelopeState::Completed);

        match &result {
            Ok(()) => tracing::info!(run_id = %self.run_id, "job complete"),
            Err(e) => tracing::warn!(run_id = %self.run_id, error = %e, "job failed"),
        }
        result.map(|()| self.state)
    }

    fn transition(&mut self, next: EnvelopeState) {
        tracing::debug!(run_id = %self.run_id, from = ?self.state, to = ?next, "envelope transition");
        self.state = next;
    }
}

impl std::fmt::Debug for TaskEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEnvelope")
            .field("run_id", &self.run_id)
            .field("ticket", &self.ticket)
            .field("tenant_id", &self.tenant_id)
            .field("job", &self.job.name())
            .field("state", &self.state)
            .finish()
    }
}
