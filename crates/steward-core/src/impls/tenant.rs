//! TenantProvider の実装
//!
//! - `FixedTenantProvider`: 常に同じテナント（ダミー実装）
//! - `AmbientTenantProvider`: スレッドローカルにテナントを保持し、`run_as` の間だけ切り替える

use std::cell::RefCell;

use crate::domain::{StewardError, TenantId};
use crate::ports::TenantProvider;

/// Always reports one tenant and runs work directly.
#[derive(Debug, Clone)]
pub struct FixedTenantProvider {
    tenant_id: TenantId,
}

impl FixedTenantProvider {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }
}

impl TenantProvider for FixedTenantProvider {
    fn current_tenant_id(&self) -> TenantId {
        self.tenant_id.clone()
    }

    fn run_as(
        &self,
        _tenant_id: &TenantId,
        work: &mut dyn FnMut() -> Result<(), StewardError>,
    ) -> Result<(), StewardError> {
        work()
    }
}

thread_local! {
    static CURRENT_TENANT: RefCell<Option<TenantId>> = const { RefCell::new(None) };
}

/// Tenant held per thread; falls back to a default tenant when none is set.
#[derive(Debug, Clone)]
pub struct AmbientTenantProvider {
    default_tenant: TenantId,
}

impl AmbientTenantProvider {
    pub fn new(default_tenant: TenantId) -> Self {
        Self { default_tenant }
    }

    /// Sets the calling thread's tenant until the returned scope drops.
    #[must_use = "the previous tenant is restored as soon as the scope is dropped"]
    pub fn enter(&self, tenant_id: TenantId) -> TenantScope {
        let previous = CURRENT_TENANT.with(|slot| slot.borrow_mut().replace(tenant_id));
        TenantScope { previous }
    }
}

impl TenantProvider for AmbientTenantProvider {
    fn current_tenant_id(&self) -> TenantId {
        CURRENT_TENANT
            .with(|slot| slot.borrow().clone())
            .unwrap_or_else(|| self.default_tenant.clone())
    }

    fn run_as(
        &self,
        tenant_id: &TenantId,
        work: &mut dyn FnMut() -> Result<(), StewardError>,
    ) -> Result<(), StewardError> {
        let _scope = self.enter(tenant_id.clone());
        work()
    }
}

/// Restores the previous tenant of the thread on drop.
pub struct TenantScope {
    previous: Option<TenantId>,
}

impl Drop for TenantScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let _ = CURRENT_TENANT.try_with(|slot| *slot.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_as_switches_and_restores() {
        let provider = AmbientTenantProvider::new(TenantId::new("default"));
        let _outer = provider.enter(TenantId::new("outer"));

        let mut seen = None;
        provider
            .run_as(&TenantId::new("inner"), &mut || -> Result<(), StewardError> {
                seen = Some(provider.current_tenant_id());
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, Some(TenantId::new("inner")));
        assert_eq!(provider.current_tenant_id(), TenantId::new("outer"));
    }

    #[test]
    fn run_as_restores_on_failure() {
        let provider = AmbientTenantProvider::new(TenantId::new("default"));
        let err = provider
            .run_as(&TenantId::new("acme"), &mut || -> Result<(), StewardError> {
                Err(StewardError::job("t", "nope"))
            })
            .unwrap_err();

        assert!(matches!(err, StewardError::Job { .. }));
        assert_eq!(provider.current_tenant_id(), TenantId::new("default"));
    }

    #[test]
    fn fixed_provider_reports_its_tenant() {
        let provider = FixedTenantProvider::new(TenantId::new("someTenantId"));
        assert_eq!(provider.current_tenant_id().as_str(), "someTenantId");

        let mut ran = false;
        provider
            .run_as(&TenantId::new("other"), &mut || -> Result<(), StewardError> {
                ran = true;
                Ok(())
            })
            .unwrap();
        assert!(ran);
    }
}
