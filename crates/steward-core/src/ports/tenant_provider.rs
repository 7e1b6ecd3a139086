//! TenantProvider port - テナント解決と「テナントとして実行」

use crate::domain::{StewardError, TenantId};

/// Resolves the caller's tenant and runs work in a tenant's authorization context.
pub trait TenantProvider: Send + Sync {
    /// Tenant of the calling thread.
    fn current_tenant_id(&self) -> TenantId;

    /// Runs `work` synchronously as `tenant_id`, propagating its failure.
    fn run_as(
        &self,
        tenant_id: &TenantId,
        work: &mut dyn FnMut() -> Result<(), StewardError>,
    ) -> Result<(), StewardError>;
}
