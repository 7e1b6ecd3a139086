//! App - アプリケーション層
//!
//! ports を組み合わせて submit → capture → schedule → admit → run → cleanup を実装する。
//!
//! # 主要コンポーネント
//! - **ContextCapture**: ambient context の snapshot / install / clear
//! - **SingleFlightGuard**: 同時実行 1 件のアドミッション
//! - **ProgressTracker**: 実行中タスクの進捗
//! - **TaskEnvelope**: 上の 3 つを束ねた実行単位
//! - **Steward**: submit / query_progress の窓口
//! - **StewardBuilder**: ワイヤリングと起動時検証

pub mod builder;
pub mod capture;
pub mod config;
pub mod envelope;
pub mod progress;
pub mod single_flight;
pub mod status;
pub mod steward;

pub use self::builder::{BuildError, StewardBuilder};
pub use self::capture::{ContextCapture, ContextScope};
pub use self::config::StewardConfig;
pub use self::envelope::TaskEnvelope;
pub use self::progress::{ProgressScope, ProgressTracker};
pub use self::single_flight::{Admission, SingleFlightGuard, Ticket};
pub use self::status::StewardStatus;
pub use self::steward::{Steward, SubmitReceipt};
