//! ContextCapture - ambient context の取得・適用・消去
//!
//! - `capture()`: 投入スレッドで呼ぶ。独立したスナップショットを作る
//! - `install()`: ワーカースレッドで呼ぶ。戻り値の `ContextScope` が drop されると clear
//! - `clear()`: 何度呼んでもよい

use std::sync::Arc;

use crate::domain::{ContextSnapshot, StewardError};
use crate::ports::SecurityContextStore;

#[derive(Clone)]
pub struct ContextCapture {
    store: Arc<dyn SecurityContextStore>,
}

impl ContextCapture {
    pub fn new(store: Arc<dyn SecurityContextStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the calling thread's ambient context.
    ///
    /// No ambient context is fine (empty snapshot). A store failure is not
    /// papered over with an empty snapshot.
    pub fn capture(&self) -> Result<ContextSnapshot, StewardError> {
        let ambient = self.store.current()?;
        ContextSnapshot::capture(&ambient)
    }

    /// Makes `snapshot` the calling thread's ambient context until the
    /// returned scope is dropped.
    #[must_use = "the context is cleared as soon as the scope is dropped"]
    pub fn install(&self, snapshot: &ContextSnapshot) -> ContextScope {
        tracing::debug!(principal = ?snapshot.principal(), "installing captured context");
        self.store.set_current(snapshot.to_context());
        ContextScope {
            store: Arc::clone(&self.store),
        }
    }

    pub fn clear(&self) {
        self.store.clear_current();
    }
}

/// Clears the ambient context of the thread it is dropped on.
pub struct ContextScope {
    store: Arc<dyn SecurityContextStore>,
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        self.store.clear_current();
        tracing::debug!("cleared worker context");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Authentication, SecurityContext};
    use crate::impls::ThreadLocalContextStore;

    struct BrokenStore;

    impl SecurityContextStore for BrokenStore {
        fn current(&self) -> Result<SecurityContext, StewardError> {
            Err(StewardError::ContextCapture("store offline".into()))
        }
        fn set_current(&self, _context: SecurityContext) {}
        fn clear_current(&self) {}
    }

    fn alice() -> SecurityContext {
        SecurityContext::authenticated(Authentication::user("alice", &["ROLE_USER"]))
    }

    #[test]
    fn capture_is_isolated_from_later_changes() {
        let store = Arc::new(ThreadLocalContextStore::new());
        let capture = ContextCapture::new(store.clone());

        store.set_current(alice());
        let snapshot = capture.capture().unwrap();

        store.set_current(SecurityContext::authenticated(Authentication::user("mallory", &[])));
        assert_eq!(snapshot.principal(), Some("alice"));

        store.clear_current();
        assert_eq!(snapshot.principal(), Some("alice"));
    }

    #[test]
    fn capture_without_context_is_empty() {
        let capture = ContextCapture::new(Arc::new(ThreadLocalContextStore::new()));
        let snapshot = capture.capture().unwrap();
        assert!(snapshot.context().is_anonymous());
    }

    #[test]
    fn capture_failure_is_reported() {
        let capture = ContextCapture::new(Arc::new(BrokenStore));
        let err = capture.capture().unwrap_err();
        assert!(matches!(err, StewardError::ContextCapture(_)));
    }

    #[test]
    fn install_scope_clears_on_drop() {
        let store = Arc::new(ThreadLocalContextStore::new());
        let capture = ContextCapture::new(store.clone());
        let snapshot = ContextSnapshot::capture(&alice()).unwrap();

        {
            let _scope = capture.install(&snapshot);
            assert_eq!(store.current().unwrap().principal(), Some("alice"));
        }
        assert!(store.current().unwrap().is_anonymous());

        // clear は冪等
        capture.clear();
        capture.clear();
        assert!(store.current().unwrap().is_anonymous());
    }

    #[test]
    fn install_on_another_thread_does_not_touch_submitter() {
        let store = Arc::new(ThreadLocalContextStore::new());
        let capture = ContextCapture::new(store.clone());

        store.set_current(alice());
        let snapshot = capture.capture().unwrap();

        let worker_store = store.clone();
        let worker_capture = capture.clone();
        let seen = std::thread::spawn(move || {
            let before = worker_store.current().unwrap().principal().map(str::to_owned);
            let during = {
                let _scope = worker_capture.install(&snapshot);
                worker_store.current().unwrap().principal().map(str::to_owned)
            };
            let after = worker_store.current().unwrap().is_anonymous();
            (before, during, after)
        })
        .join()
        .unwrap();

        assert_eq!(seen, (None, Some("alice".to_string()), true));
        assert_eq!(store.current().unwrap().principal(), Some("alice"));
    }
}
