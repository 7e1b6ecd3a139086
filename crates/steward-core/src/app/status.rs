//! Status - ステータスクエリ

use serde::{Deserialize, Serialize};

/// Point-in-time view for status endpoints.
///
/// The two fields are read separately, so right at a run boundary one may
/// already reflect the next state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StewardStatus {
    pub active_ticket: Option<u64>,
    pub progress: Option<u32>,
}

impl StewardStatus {
    pub fn is_idle(&self) -> bool {
        self.active_ticket.is_none() && self.progress.is_none()
    }
}
