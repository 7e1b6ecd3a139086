//! steward-core
//!
//! Context-propagating, single-flight task execution.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, context, tenant, state, errors）
//! - **ports**: 外部コラボレーターの抽象化（SecurityContextStore, TenantProvider, Scheduler, Clock, IdGenerator, Job）
//! - **app**: アプリケーションロジック（capture, single_flight, progress, envelope, steward, builder）
//! - **impls**: 開発用の実装（thread-local store, tenant providers, TokioScheduler, CountingJob）
//!
//! # Flow
//! 1. `Steward::submit()` runs on the caller's thread and captures tenant + security context.
//! 2. The resulting `TaskEnvelope` is handed to a `Scheduler`, which runs it later on some worker thread.
//! 3. The envelope takes the single-flight slot, installs the captured context and runs the job as the tenant.
//! 4. Slot, context and progress are released on every exit path.

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;

pub use app::{Steward, StewardBuilder, StewardConfig};
pub use domain::{ContextSnapshot, SecurityContext, StewardError, TenantId};
