//! campus-core: framework-agnostic core for the campus backend.
//!
//! One deployment serves many independent colleges. Everything that keeps
//! their data apart lives here: the tenant and principal model, the error
//! taxonomy, the document datastore abstraction and the tenant-scoped
//! access enforcer that every resource query must flow through.

pub mod errors;
pub mod principal;
pub mod scoped;
pub mod store;
pub mod tenant;

pub use errors::{CampusError, ErrorKind};
pub use principal::{PrincipalContext, PrincipalStatus, Role};
pub use scoped::{ScopedCollection, TenantScope, TENANT_KEY};
pub use store::{filter_eq, Datastore, Filter, MemoryStore};
pub use tenant::{Tenant, TenantContext, TenantId};
