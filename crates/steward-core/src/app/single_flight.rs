//! SingleFlightGuard - 同時に 1 つだけ実行を許可するスロット
//!
//! The active slot is a single `AtomicU64`: `0` means empty, anything else is
//! the ticket of the occupying envelope. Admission is one `compare_exchange`,
//! so of any number of racing `try_acquire` calls exactly one wins.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

const EMPTY: u64 = 0;

/// Identity of one envelope as seen by the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(NonZeroU64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One admission slot. Share it with `Arc` between every envelope of the same logical job.
#[derive(Debug)]
pub struct SingleFlightGuard {
    slot: AtomicU64,
    next_ticket: AtomicU64,
}

impl SingleFlightGuard {
    pub fn new() -> Self {
        Self {
            slot: AtomicU64::new(EMPTY),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Issues a fresh ticket. Tickets are never 0 and never repeat.
    pub fn issue(&self) -> Ticket {
        loop {
            let n = self.next_ticket.fetch_add(1, Ordering::Relaxed);
            // u64 の wrap-around で 0 を踏んだ場合だけ読み飛ばす
            if let Some(n) = NonZeroU64::new(n) {
                return Ticket(n);
            }
        }
    }

    /// Occupies the slot with `candidate` if it is empty.
    pub fn try_acquire(&self, candidate: Ticket) -> bool {
        self.slot
            .compare_exchange(EMPTY, candidate.get(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Like `try_acquire`, but the slot is released when the returned admission drops.
    #[must_use = "the slot is released as soon as the admission is dropped"]
    pub fn admit(&self, candidate: Ticket) -> Option<Admission<'_>> {
        self.try_acquire(candidate).then(|| Admission {
            guard: self,
            ticket: candidate,
        })
    }

    /// Empties the slot, whoever holds it. Idempotent.
    pub fn release(&self) {
        self.slot.store(EMPTY, Ordering::Release);
    }

    /// Ticket currently occupying the slot. Never blocks.
    pub fn current(&self) -> Option<Ticket> {
        NonZeroU64::new(self.slot.load(Ordering::Acquire)).map(Ticket)
    }
}

impl Default for SingleFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Held while an envelope owns the slot.
pub struct Admission<'a> {
    guard: &'a SingleFlightGuard,
    ticket: Ticket,
}

impl Admission<'_> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.guard.release();
        tracing::debug!(ticket = %self.ticket, "released single-flight slot");
    }
}
