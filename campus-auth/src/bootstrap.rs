// Tenant bootstrap.

use std::sync::Arc;

use anyhow::Result;
use campus_core::errors::CampusError;
use campus_core::{
    filter_eq, Datastore, PrincipalStatus, Role, Tenant, TenantContext, TenantId, TenantScope,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::hasher::PasswordHasher;
use crate::login::strip_password;

#[derive(Clone, Debug, Deserialize)]
pub struct TenantAttrs {
    pub name: String,
    pub code: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AdminAttrs {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Creates a new tenant together with its first ADMIN as one logical unit.
pub struct Bootstrap {
    store: Arc<dyn Datastore>,
    hasher: PasswordHasher,
}

impl Bootstrap {
    pub fn new(store: Arc<dyn Datastore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Afterwards either both the tenant and its admin exist, or neither.
    ///
    /// The password is hashed before any write, so a weak credential can
    /// never strand an adminless tenant. If the admin write fails, the
    /// tenant is deleted again; if that compensation also fails the error
    /// is escalated to an atomicity violation.
    pub async fn create_tenant_with_admin(
        &self,
        tenant: TenantAttrs,
        admin: AdminAttrs,
    ) -> Result<(Tenant, Value)> {
        let code = tenant.code.trim();
        if code.is_empty() || tenant.name.trim().is_empty() {
            return Err(CampusError::bad_request("Tenant name and code are required").into_anyhow());
        }
        let email = admin.email.trim();
        if email.is_empty() {
            return Err(CampusError::bad_request("Admin email is required").into_anyhow());
        }

        let password_hash = self.hasher.hash_password(&admin.password)?;

        if self
            .store
            .find_one("tenants", &filter_eq("code", code))
            .await?
            .is_some()
        {
            return Err(
                CampusError::conflict(format!("Tenant code '{code}' already exists")).into_anyhow(),
            );
        }

        let record = Tenant {
            id: TenantId(Uuid::new_v4().to_string()),
            name: tenant.name.trim().to_string(),
            code: code.to_string(),
        };
        self.store
            .insert("tenants", serde_json::to_value(&record)?)
            .await?;

        let scope = TenantScope::new(
            Arc::clone(&self.store),
            &TenantContext {
                tenant_id: record.id.clone(),
            },
        )?;
        let admins = scope.collection(Role::Admin.collection());
        let document = json!({
            "name": admin.name,
            "email": email,
            "password": password_hash,
            "role": Role::Admin,
            "status": PrincipalStatus::Active,
        });

        match admins.insert(document).await {
            Ok(created) => {
                info!(tenant = %record.code, "tenant bootstrapped");
                Ok((record, strip_password(created)))
            }
            Err(admin_err) => match self
                .store
                .delete_one("tenants", &filter_eq("id", record.id.as_str()))
                .await
            {
                Ok(_) => Err(admin_err),
                Err(rollback_err) => {
                    warn!(tenant = %record.code, error = %rollback_err, "compensating tenant delete failed");
                    Err(
                        CampusError::atomicity("Tenant bootstrap failed and rollback did not complete")
                            .with_source(admin_err)
                            .into_anyhow(),
                    )
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PasswordPolicy;
    use async_trait::async_trait;
    use campus_core::errors::ErrorKind;
    use campus_core::{Filter, MemoryStore};

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordPolicy {
            min_length: 8,
            cost: 4,
        })
    }

    fn attrs() -> (TenantAttrs, AdminAttrs) {
        (
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
    }

    #[tokio::test]
    async fn creates_tenant_and_admin_together() {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());
        let (tenant, admin) = attrs();

        let (record, created) = bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap();

        assert_eq!(record.code, "IWE");
        assert_eq!(created["role"], "ADMIN");
        assert_eq!(created["tenantId"], record.id.as_str());
        assert!(created.get("password").is_none());
        assert_eq!(store.count("tenants", &Filter::new()).await.unwrap(), 1);
        assert_eq!(store.count("admins", &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_tenant_codes_conflict() {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());

        let (tenant, admin) = attrs();
        bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap();

        let (tenant, admin) = attrs();
        let err = bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::Conflict
        );
        assert_eq!(store.count("tenants", &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn weak_admin_password_leaves_no_tenant_behind() {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());

        let (tenant, mut admin) = attrs();
        admin.password = "short".to_string();
        let err = bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::WeakCredential
        );
        assert_eq!(store.count("tenants", &Filter::new()).await.unwrap(), 0);
    }

    /// Delegates to a memory store but refuses every admin write.
    struct AdminWriteFails(MemoryStore);

    #[async_trait]
    impl Datastore for AdminWriteFails {
        async fn insert(&self, collection: &str, document: Value) -> Result<Value> {
            if collection == "admins" {
                return Err(anyhow::anyhow!("storage unavailable"));
            }
            self.0.insert(collection, document).await
        }
        async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
            self.0.find(collection, filter).await
        }
        async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
            self.0.find_one(collection, filter).await
        }
        async fn update_one(
            &self,
            collection: &str,
            filter: &Filter,
            changes: &Filter,
        ) -> Result<Option<Value>> {
            self.0.update_one(collection, filter, changes).await
        }
        async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
            self.0.delete_one(collection, filter).await
        }
        async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
            self.0.count(collection, filter).await
        }
    }

    #[tokio::test]
    async fn failed_admin_write_rolls_the_tenant_back() {
        let store: Arc<dyn Datastore> = Arc::new(AdminWriteFails(MemoryStore::new()));
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());

        let (tenant, admin) = attrs();
        let err = bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "storage unavailable");

        // No orphan tenant remains.
        assert_eq!(store.count("tenants", &Filter::new()).await.unwrap(), 0);
        assert_eq!(store.count("admins", &Filter::new()).await.unwrap(), 0);
    }

    /// Refuses admin writes and the compensating tenant delete.
    struct RollbackAlsoFails(MemoryStore);

    #[async_trait]
    impl Datastore for RollbackAlsoFails {
        async fn insert(&self, collection: &str, document: Value) -> Result<Value> {
            if collection == "admins" {
                return Err(anyhow::anyhow!("storage unavailable"));
            }
            self.0.insert(collection, document).await
        }
        async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
            self.0.find(collection, filter).await
        }
        async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
            self.0.find_one(collection, filter).await
        }
        async fn update_one(
            &self,
            collection: &str,
            filter: &Filter,
            changes: &Filter,
        ) -> Result<Option<Value>> {
            self.0.update_one(collection, filter, changes).await
        }
        async fn delete_one(&self, _collection: &str, _filter: &Filter) -> Result<Option<Value>> {
            Err(anyhow::anyhow!("still unavailable"))
        }
        async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
            self.0.count(collection, filter).await
        }
    }

    #[tokio::test]
    async fn failed_rollback_escalates_to_atomicity() {
        let store: Arc<dyn Datastore> = Arc::new(RollbackAlsoFails(MemoryStore::new()));
        let bootstrap = Bootstrap::new(Arc::clone(&store), hasher());

        let (tenant, admin) = attrs();
        let err = bootstrap
            .create_tenant_with_admin(tenant, admin)
            .await
            .unwrap_err();
        assert_eq!(
            CampusError::from_anyhow(&err).unwrap().kind,
            ErrorKind::Atomicity
        );
    }
}
