use crate::domain::StewardError;

/// The task body: one no-argument execution method.
///
/// Runs on a scheduler thread with the submitter's context installed.
/// A job that reports progress holds its own `Arc<ProgressTracker>`; the
/// `ProgressScope` returned by `start()` retracts it when `run` exits.
/// The envelope never touches progress itself.
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self) -> Result<(), StewardError>;
}
