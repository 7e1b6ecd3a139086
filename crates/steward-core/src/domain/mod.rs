//! Domain model (identifiers, ambient context values, envelope state, errors).

pub mod context;
pub mod errors;
pub mod ids;
pub mod state;
pub mod tenant;

pub use self::context::{Authentication, ContextSnapshot, SecurityContext};
pub use self::errors::StewardError;
pub use self::ids::{Id, IdMarker, RunId};
pub use self::state::EnvelopeState;
pub use self::tenant::TenantId;
