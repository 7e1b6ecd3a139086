//! SecurityContextStore port - ambient context の保存先

use crate::domain::{SecurityContext, StewardError};

/// Per-thread ambient security context.
///
/// Every method acts on the calling thread's slot only.
pub trait SecurityContextStore: Send + Sync {
    /// Current ambient context; the anonymous context when nothing is set.
    fn current(&self) -> Result<SecurityContext, StewardError>;

    fn set_current(&self, context: SecurityContext);

    /// Idempotent.
    fn clear_current(&self);
}
