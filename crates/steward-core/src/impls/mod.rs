//! Impls - ports の実装（開発用・テスト用）
//!
//! 本番ではアプリケーション側の認証基盤・テナント基盤に差し替える。

pub mod counting_job;
pub mod tenant;
pub mod thread_local_store;
pub mod tokio_scheduler;

pub use self::counting_job::{CountingJob, CountingJobConfig};
pub use self::tenant::{AmbientTenantProvider, FixedTenantProvider, TenantScope};
pub use self::thread_local_store::ThreadLocalContextStore;
pub use self::tokio_scheduler::TokioScheduler;
