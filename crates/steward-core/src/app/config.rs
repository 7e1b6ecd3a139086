use serde::{Deserialize, Serialize};

/// Runtime settings of a `Steward`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    /// Delay between submission and the requested execution time.
    pub schedule_delay_ms: u64,
}

impl StewardConfig {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// `None` when the delay does not fit a `chrono::Duration`.
    pub fn schedule_delay(&self) -> Option<chrono::Duration> {
        i64::try_from(self.schedule_delay_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
    }
}
