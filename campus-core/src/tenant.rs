//! Core multi-tenant types.

use serde::{Deserialize, Serialize};

/// Identifier of an isolated college sharing the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted tenant record, the root of isolation. Created once via
/// bootstrap; rarely mutated; never deleted in normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// Short public code carried in the login-boundary header.
    pub code: String,
}

/// Context carried with every tenant-scoped operation.
///
/// Pre-authentication this comes from the tenant header; once a session is
/// validated it is derived exclusively from the token's embedded claim.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

impl TenantContext {
    /// Convenience constructor from a string.
    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
        }
    }
}
