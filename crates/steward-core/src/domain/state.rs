//! Envelope state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle of one `TaskEnvelope`.
///
/// State transitions:
/// - Created -> Admitted -> Running -> Completed
/// - Created -> Rejected (another run holds the single-flight slot)
///
/// A job failure still ends in `Completed` internally; the failure itself is
/// returned to the scheduler as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvelopeState {
    Created,
    Admitted,
    Running,
    Completed,
    Rejected,
}

impl EnvelopeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, EnvelopeState::Completed | EnvelopeState::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::created(EnvelopeState::Created, false)]
    #[case::admitted(EnvelopeState::Admitted, false)]
    #[case::running(EnvelopeState::Running, false)]
    #[case::completed(EnvelopeState::Completed, true)]
    #[case::rejected(EnvelopeState::Rejected, true)]
    fn terminal_states(#[case] state: EnvelopeState, #[case] expected: bool) {
        assert_eq!(state.is_terminal(), expected);
    }
}
