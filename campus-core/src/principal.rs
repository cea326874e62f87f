//! Principals: the authenticated identities of a tenant.

use serde::{Deserialize, Serialize};

use crate::tenant::{TenantContext, TenantId};

/// Role of a principal within its tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Collection holding principal records of this role. Each record
    /// carries {id, tenantId, name, email, password(hash), role, status}.
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Teacher => "teachers",
            Role::Student => "students",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

/// Login eligibility of a principal. Suspended principals keep their
/// records but cannot obtain a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    #[default]
    Active,
    Suspended,
}

impl PrincipalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalStatus::Active => "active",
            PrincipalStatus::Suspended => "suspended",
        }
    }
}

/// The validated identity attached to a request after session validation.
///
/// The tenant id here comes from the token's claim and is the only tenant
/// signal a protected request may act on.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalContext {
    pub principal_id: String,
    pub role: Role,
    pub tenant_id: TenantId,
}

impl PrincipalContext {
    /// Tenant context derived from the session claim.
    pub fn tenant(&self) -> TenantContext {
        TenantContext {
            tenant_id: self.tenant_id.clone(),
        }
    }
}
