//! Tenant-scoped data access.
//!
//! The only door to tenant-owned collections. A [`TenantScope`] is bound to
//! one tenant at construction; every collection handle it hands out merges
//! that tenant id into every filter and strips any caller-supplied
//! `tenantId` key, so an unscoped or redirected query cannot be expressed.

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::errors::CampusError;
use crate::store::{Datastore, Filter};
use crate::tenant::{TenantContext, TenantId};

/// Document key carrying the owning tenant on every tenant-owned entity.
pub const TENANT_KEY: &str = "tenantId";

/// Factory for scoped collection handles, bound to one tenant.
pub struct TenantScope {
    store: Arc<dyn Datastore>,
    tenant_id: TenantId,
}

impl std::fmt::Debug for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantScope")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

impl TenantScope {
    /// Bind a scope to the given tenant context.
    ///
    /// A blank tenant id is an internal invariant violation and is rejected
    /// here rather than allowed to degenerate into an unscoped query.
    pub fn new(store: Arc<dyn Datastore>, ctx: &TenantContext) -> Result<Self> {
        if ctx.tenant_id.as_str().trim().is_empty() {
            return Err(CampusError::tenant_required("No tenant id in context").into_anyhow());
        }
        Ok(Self {
            store,
            tenant_id: ctx.tenant_id.clone(),
        })
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn collection(&self, name: impl Into<String>) -> ScopedCollection {
        ScopedCollection {
            store: Arc::clone(&self.store),
            name: name.into(),
            tenant_id: self.tenant_id.clone(),
        }
    }
}

/// A repository handle whose every operation is constrained to one tenant.
pub struct ScopedCollection {
    store: Arc<dyn Datastore>,
    name: String,
    tenant_id: TenantId,
}

impl ScopedCollection {
    fn scope(&self, mut filter: Filter) -> Filter {
        // A caller-supplied tenant key never survives.
        filter.remove(TENANT_KEY);
        filter.insert(
            TENANT_KEY.to_string(),
            Value::String(self.tenant_id.0.clone()),
        );
        filter
    }

    fn sanitize_changes(mut changes: Filter) -> Filter {
        // Neither the owning tenant nor the id of a record ever changes.
        changes.remove(TENANT_KEY);
        changes.remove("id");
        changes
    }

    /// Insert a document stamped with the bound tenant id.
    pub async fn insert(&self, mut document: Value) -> Result<Value> {
        if let Some(map) = document.as_object_mut() {
            map.insert(
                TENANT_KEY.to_string(),
                Value::String(self.tenant_id.0.clone()),
            );
        }
        self.store.insert(&self.name, document).await
    }

    pub async fn find(&self, filter: Filter) -> Result<Vec<Value>> {
        self.store.find(&self.name, &self.scope(filter)).await
    }

    pub async fn find_one(&self, filter: Filter) -> Result<Option<Value>> {
        self.store.find_one(&self.name, &self.scope(filter)).await
    }

    pub async fn find_one_and_update(
        &self,
        filter: Filter,
        changes: Filter,
    ) -> Result<Option<Value>> {
        self.store
            .update_one(&self.name, &self.scope(filter), &Self::sanitize_changes(changes))
            .await
    }

    pub async fn find_one_and_delete(&self, filter: Filter) -> Result<Option<Value>> {
        self.store.delete_one(&self.name, &self.scope(filter)).await
    }

    pub async fn count(&self, filter: Filter) -> Result<usize> {
        self.store.count(&self.name, &self.scope(filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::{filter_eq, MemoryStore};
    use serde_json::json;

    fn store() -> Arc<dyn Datastore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn blank_tenant_is_rejected() {
        let err = TenantScope::new(store(), &TenantContext::new("  ")).unwrap_err();
        let campus = CampusError::from_anyhow(&err).unwrap();
        assert_eq!(campus.kind, ErrorKind::TenantRequired);
    }

    #[tokio::test]
    async fn inserts_are_stamped_and_reads_are_scoped() {
        let store = store();
        let t1 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t1")).unwrap();
        let t2 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t2")).unwrap();

        let stored = t1
            .collection("students")
            .insert(json!({"name": "Ada"}))
            .await
            .unwrap();
        assert_eq!(stored[TENANT_KEY], "t1");

        assert_eq!(
            t1.collection("students").find(Filter::new()).await.unwrap().len(),
            1
        );
        assert_eq!(
            t2.collection("students").find(Filter::new()).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn caller_supplied_tenant_key_is_overridden() {
        let store = store();
        let t1 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t1")).unwrap();
        let t2 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t2")).unwrap();

        t2.collection("students")
            .insert(json!({"name": "Eve"}))
            .await
            .unwrap();

        // A filter that names another tenant still resolves to our own.
        let found = t1
            .collection("students")
            .find(filter_eq(TENANT_KEY, "t2"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn updates_cannot_move_a_record_between_tenants() {
        let store = store();
        let t1 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t1")).unwrap();

        let stored = t1
            .collection("students")
            .insert(json!({"name": "Ada"}))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        let mut changes = filter_eq("name", "Ada L.");
        changes.insert(TENANT_KEY.to_string(), json!("t2"));
        changes.insert("id".to_string(), json!("hijacked"));

        let updated = t1
            .collection("students")
            .find_one_and_update(filter_eq("id", id), changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["name"], "Ada L.");
        assert_eq!(updated[TENANT_KEY], "t1");
        assert_eq!(updated["id"], id);
    }

    #[tokio::test]
    async fn deletes_do_not_cross_tenants() {
        let store = store();
        let t1 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t1")).unwrap();
        let t2 = TenantScope::new(Arc::clone(&store), &TenantContext::new("t2")).unwrap();

        let stored = t2
            .collection("students")
            .insert(json!({"name": "Eve"}))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        let removed = t1
            .collection("students")
            .find_one_and_delete(filter_eq("id", id))
            .await
            .unwrap();
        assert!(removed.is_none());
        assert_eq!(
            t2.collection("students").count(Filter::new()).await.unwrap(),
            1
        );
    }
}
