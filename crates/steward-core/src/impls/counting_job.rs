//! CountingJob - 進捗を報告する長時間ジョブ（デモ用）

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ProgressTracker;
use crate::domain::StewardError;
use crate::ports::Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountingJobConfig {
    pub steps: u32,
    pub step_ms: u64,
}

impl Default for CountingJobConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            step_ms: 50,
        }
    }
}

/// Publishes 0..steps, sleeping `step_ms` after each step.
pub struct CountingJob {
    progress: Arc<ProgressTracker>,
    config: CountingJobConfig,
}

impl CountingJob {
    pub fn new(progress: Arc<ProgressTracker>, config: CountingJobConfig) -> Self {
        Self { progress, config }
    }
}

impl Job for CountingJob {
    fn name(&self) -> &str {
        "counting"
    }

    fn run(&self) -> Result<(), StewardError> {
        let progress = self.progress.start();
        let step = Duration::from_millis(self.config.step_ms);
        for i in 0..self.config.steps {
            progress.update(i);
            std::thread::sleep(step);
        }
        Ok(())
    }
}
