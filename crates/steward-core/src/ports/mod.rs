//! Ports - 外部コラボレーターの抽象化
//!
//! 各 trait は core の外側にあるもの（認証基盤、テナント解決、スレッドプール）
//! へのインターフェースです。実装は `impls` またはアプリケーション側に置きます。

pub mod clock;
pub mod context_store;
pub mod id_generator;
pub mod job;
pub mod scheduler;
pub mod tenant_provider;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::context_store::SecurityContextStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::job::Job;
pub use self::scheduler::{Scheduler, Unit};
pub use self::tenant_provider::TenantProvider;
