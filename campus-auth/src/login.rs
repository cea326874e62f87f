// Credential verification and session issuance.

use std::sync::Arc;

use anyhow::Result;
use campus_core::errors::CampusError;
use campus_core::{
    filter_eq, Datastore, PrincipalContext, PrincipalStatus, Role, Tenant, TenantContext,
    TenantScope,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::hasher::PasswordHasher;
use crate::token::SessionTokens;

/// The one message every credential failure produces. Unknown email and
/// wrong password must be indistinguishable on the wire.
const INVALID_LOGIN: &str = "Invalid login";

/// Login credentials. The canonical identifier is the principal's email.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// A freshly issued session plus a client-safe principal summary.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub principal: Value,
}

/// Looks up a principal by tenant + role + email, verifies the password
/// and issues a signed session token. Purely computational; nothing is
/// persisted.
pub struct Authenticator {
    store: Arc<dyn Datastore>,
    hasher: PasswordHasher,
    tokens: SessionTokens,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Datastore>, hasher: PasswordHasher, tokens: SessionTokens) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    /// Resolve a tenant from the login-boundary header value.
    pub async fn resolve_tenant(&self, code: &str) -> Result<Tenant> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CampusError::missing_tenant("Missing tenant header").into_anyhow());
        }
        let document = self
            .store
            .find_one("tenants", &filter_eq("code", code))
            .await?
            .ok_or_else(|| CampusError::missing_tenant("Unknown tenant").into_anyhow())?;
        serde_json::from_value(document).map_err(|e| anyhow::anyhow!(e))
    }

    /// Verify credentials against one tenant and issue a session.
    pub async fn login(&self, tenant_code: &str, credentials: &Credentials) -> Result<Session> {
        let tenant = self.resolve_tenant(tenant_code).await?;
        let scope = TenantScope::new(
            Arc::clone(&self.store),
            &TenantContext {
                tenant_id: tenant.id.clone(),
            },
        )?;
        let principals = scope.collection(credentials.role.collection());

        let Some(principal) = principals
            .find_one(filter_eq("email", credentials.email.trim()))
            .await?
        else {
            return Err(CampusError::invalid_credentials(INVALID_LOGIN).into_anyhow());
        };

        let stored_hash = principal.get("password").and_then(|v| v.as_str());
        let verified = match stored_hash {
            Some(stored_hash) => self
                .hasher
                .verify_password(&credentials.password, stored_hash)
                .unwrap_or(false),
            None => false,
        };
        if !verified {
            return Err(CampusError::invalid_credentials(INVALID_LOGIN).into_anyhow());
        }

        if principal.get("status").and_then(|v| v.as_str())
            == Some(PrincipalStatus::Suspended.as_str())
        {
            return Err(CampusError::account_disabled("Account is suspended").into_anyhow());
        }

        let principal_id = principal
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CampusError::general_error("Principal record has no id").into_anyhow())?;

        let context = PrincipalContext {
            principal_id: principal_id.to_string(),
            role: credentials.role,
            tenant_id: tenant.id.clone(),
        };
        let access_token = self.tokens.issue(&context)?;

        info!(tenant = %tenant.code, role = credentials.role.as_str(), "login succeeded");

        Ok(Session {
            access_token,
            principal: strip_password(principal),
        })
    }
}

/// Remove the stored hash before a principal document leaves the API.
pub fn strip_password(mut document: Value) -> Value {
    if let Value::Object(ref mut map) = document {
        map.remove("password");
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{AdminAttrs, Bootstrap, TenantAttrs};
    use crate::options::{JwtOptions, PasswordPolicy};
    use campus_core::errors::ErrorKind;
    use campus_core::MemoryStore;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordPolicy {
            min_length: 8,
            cost: 4,
        })
    }

    fn tokens() -> SessionTokens {
        let mut options = JwtOptions::default();
        options.secret = Some("test-secret".to_string());
        SessionTokens::new(options)
    }

    async fn seeded() -> (Arc<dyn Datastore>, Authenticator) {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());
        bootstrap
            .create_tenant_with_admin(
                TenantAttrs {
                    name: "Institute of Web Engineering".to_string(),
                    code: "IWE".to_string(),
                },
                AdminAttrs {
                    name: "Vineeth".to_string(),
                    email: "vineeth@iwe.edu".to_string(),
                    password: "admin123".to_string(),
                },
            )
            .await
            .unwrap();
        let auth = Authenticator::new(Arc::clone(&store), hasher(), tokens());
        (store, auth)
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_bound_to_the_tenant() {
        let (_store, auth) = seeded().await;
        let session = auth
            .login("IWE", &credentials("vineeth@iwe.edu", "admin123"))
            .await
            .unwrap();

        let decoded = auth.tokens().verify(&session.access_token).unwrap();
        assert_eq!(decoded.role, Role::Admin);

        let tenant = auth.resolve_tenant("IWE").await.unwrap();
        assert_eq!(decoded.tenant_id, tenant.id);

        // The summary never carries the hash.
        assert!(session.principal.get("password").is_none());
        assert_eq!(session.principal["email"], "vineeth@iwe.edu");
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (_store, auth) = seeded().await;

        let unknown = auth
            .login("IWE", &credentials("nobody@iwe.edu", "admin123"))
            .await
            .unwrap_err();
        let wrong = auth
            .login("IWE", &credentials("vineeth@iwe.edu", "wrong-password"))
            .await
            .unwrap_err();

        let unknown = CampusError::from_anyhow(&unknown).unwrap();
        let wrong = CampusError::from_anyhow(&wrong).unwrap();
        assert_eq!(unknown.to_json(), wrong.to_json());
        assert_eq!(unknown.kind, ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn unknown_tenant_is_a_missing_tenant_error() {
        let (_store, auth) = seeded().await;
        let err = auth
            .login("NOPE", &credentials("vineeth@iwe.edu", "admin123"))
            .await
            .unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::MissingTenant
        );
    }

    #[tokio::test]
    async fn wrong_role_does_not_find_the_principal() {
        let (_store, auth) = seeded().await;
        let mut creds = credentials("vineeth@iwe.edu", "admin123");
        creds.role = Role::Student;
        let err = auth.login("IWE", &creds).await.unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn suspended_principals_cannot_log_in() {
        let (store, auth) = seeded().await;
        store
            .update_one(
                "admins",
                &filter_eq("email", "vineeth@iwe.edu"),
                &filter_eq("status", "suspended"),
            )
            .await
            .unwrap()
            .unwrap();

        let err = auth
            .login("IWE", &credentials("vineeth@iwe.edu", "admin123"))
            .await
            .unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::AccountDisabled
        );
    }
}
