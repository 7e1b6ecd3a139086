//! ThreadLocalContextStore - スレッドローカルな ambient context
//!
//! All instances share one slot per thread, like a process-wide context holder.

use std::cell::RefCell;

use crate::domain::{SecurityContext, StewardError};
use crate::ports::SecurityContextStore;

thread_local! {
    static CURRENT: RefCell<Option<SecurityContext>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalContextStore;

impl ThreadLocalContextStore {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityContextStore for ThreadLocalContextStore {
    fn current(&self) -> Result<SecurityContext, StewardError> {
        CURRENT
            .try_with(|slot| slot.borrow().clone().unwrap_or_default())
            .map_err(|e| StewardError::ContextCapture(format!("thread-local unavailable: {e}")))
    }

    fn set_current(&self, context: SecurityContext) {
        CURRENT.with(|slot| *slot.borrow_mut() = Some(context));
    }

    fn clear_current(&self) {
        // thread 終了中（TLS 破棄後）の drop でも panic しない
        let _ = CURRENT.try_with(|slot| slot.borrow_mut().take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Authentication;

    #[test]
    fn each_thread_has_its_own_slot() {
        let store = ThreadLocalContextStore::new();
        store.set_current(SecurityContext::authenticated(Authentication::user("alice", &[])));

        let other = std::thread::spawn(move || store.current().unwrap().is_anonymous())
            .join()
            .unwrap();

        assert!(other);
        assert_eq!(store.current().unwrap().principal(), Some("alice"));
        store.clear_current();
        assert!(store.current().unwrap().is_anonymous());
    }
}
