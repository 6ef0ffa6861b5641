use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use permitra_application::{AssignmentRepository, ReferenceRepository};
use permitra_core::{AppError, AppResult, TenantId};
use permitra_domain::{
    App, Assignment, AssignmentFilter, AssignmentId, Page, PageRequest, Permission, Role,
};

#[cfg(test)]
mod tests;

/// In-memory store implementing both the reference and assignment ports.
///
/// Used by tests and local development; the write lock around batch
/// mutations gives them the same all-or-nothing behavior as a store
/// transaction.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    roles: RwLock<HashMap<(TenantId, String), Role>>,
    permissions: RwLock<HashMap<(TenantId, String), Permission>>,
    apps: RwLock<HashMap<(TenantId, String), App>>,
    assignments: RwLock<HashMap<(TenantId, AssignmentId), Assignment>>,
}

impl InMemoryAssignmentStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a role into tenant-scoped reference data.
    pub async fn put_role(&self, tenant_id: TenantId, role: Role) {
        self.roles
            .write()
            .await
            .insert((tenant_id, role.role_id.clone()), role);
    }

    /// Seeds a permission into tenant-scoped reference data.
    pub async fn put_permission(&self, tenant_id: TenantId, permission: Permission) {
        self.permissions
            .write()
            .await
            .insert((tenant_id, permission.permission_id.clone()), permission);
    }

    /// Seeds an application into tenant-scoped reference data.
    pub async fn put_app(&self, tenant_id: TenantId, app: App) {
        self.apps
            .write()
            .await
            .insert((tenant_id, app.app_id.clone()), app);
    }

    fn pair_exists(
        assignments: &HashMap<(TenantId, AssignmentId), Assignment>,
        tenant_id: TenantId,
        role_id: &str,
        permission_id: &str,
    ) -> bool {
        assignments.values().any(|assignment| {
            assignment.tenant_id == tenant_id
                && assignment.role_id == role_id
                && assignment.permission_id == permission_id
        })
    }
}

#[async_trait]
impl ReferenceRepository for InMemoryAssignmentStore {
    async fn find_role(&self, tenant_id: TenantId, role_id: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&(tenant_id, role_id.to_owned()))
            .cloned())
    }

    async fn find_permission(
        &self,
        tenant_id: TenantId,
        permission_id: &str,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .permissions
            .read()
            .await
            .get(&(tenant_id, permission_id.to_owned()))
            .cloned())
    }

    async fn find_app(&self, tenant_id: TenantId, app_id: &str) -> AppResult<Option<App>> {
        Ok(self
            .apps
            .read()
            .await
            .get(&(tenant_id, app_id.to_owned()))
            .cloned())
    }

    async fn list_permissions_by_app(
        &self,
        tenant_id: TenantId,
        app_id: &str,
    ) -> AppResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        let mut listed: Vec<Permission> = permissions
            .iter()
            .filter_map(|((stored_tenant_id, _), permission)| {
                (stored_tenant_id == &tenant_id && permission.app_id == app_id)
                    .then(|| permission.clone())
            })
            .collect();
        listed.sort_by(|left, right| left.permission_id.cmp(&right.permission_id));
        Ok(listed)
    }

    async fn list_permissions_by_products(
        &self,
        tenant_id: TenantId,
        product_names: &BTreeSet<String>,
    ) -> AppResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        let mut listed: Vec<Permission> = permissions
            .iter()
            .filter_map(|((stored_tenant_id, _), permission)| {
                (stored_tenant_id == &tenant_id
                    && permission
                        .product_name
                        .as_deref()
                        .is_some_and(|product| product_names.contains(product)))
                .then(|| permission.clone())
            })
            .collect();
        listed.sort_by(|left, right| left.permission_id.cmp(&right.permission_id));
        Ok(listed)
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentStore {
    async fn insert(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<Assignment> {
        let mut assignments = self.assignments.write().await;

        if Self::pair_exists(&assignments, tenant_id, role_id, permission_id) {
            return Err(AppError::Conflict(format!(
                "duplicate key value violates unique constraint 'uc_assignment_key': \
                 key (permission_id, role_id, tenant_id)=({permission_id}, {role_id}, {tenant_id}) \
                 already exists"
            )));
        }

        let assignment = Assignment {
            id: AssignmentId::new(),
            tenant_id,
            role_id: role_id.to_owned(),
            permission_id: permission_id.to_owned(),
        };
        assignments.insert((tenant_id, assignment.id), assignment.clone());
        Ok(assignment)
    }

    async fn insert_missing(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: &BTreeSet<String>,
    ) -> AppResult<Vec<Assignment>> {
        // One write lock for the whole batch keeps it atomic.
        let mut assignments = self.assignments.write().await;
        let mut created = Vec::new();

        for permission_id in permission_ids {
            if Self::pair_exists(&assignments, tenant_id, role_id, permission_id) {
                continue;
            }

            let assignment = Assignment {
                id: AssignmentId::new(),
                tenant_id,
                role_id: role_id.to_owned(),
                permission_id: permission_id.clone(),
            };
            assignments.insert((tenant_id, assignment.id), assignment.clone());
            created.push(assignment);
        }

        Ok(created)
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(&(tenant_id, id))
            .cloned())
    }

    async fn delete_by_id(&self, tenant_id: TenantId, id: AssignmentId) -> AppResult<bool> {
        Ok(self
            .assignments
            .write()
            .await
            .remove(&(tenant_id, id))
            .is_some())
    }

    async fn delete_for_role(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: Option<&BTreeSet<String>>,
    ) -> AppResult<u64> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|_, assignment| {
            let matches = assignment.tenant_id == tenant_id
                && assignment.role_id == role_id
                && permission_ids
                    .is_none_or(|ids| ids.contains(assignment.permission_id.as_str()));
            !matches
        });
        Ok((before - assignments.len()) as u64)
    }

    async fn search(
        &self,
        tenant_id: TenantId,
        filter: &AssignmentFilter,
        page: PageRequest,
    ) -> AppResult<Page<Assignment>> {
        let permissions = self.permissions.read().await;
        let assignments = self.assignments.read().await;

        let mut matching: Vec<Assignment> = assignments
            .values()
            .filter(|assignment| {
                if assignment.tenant_id != tenant_id {
                    return false;
                }
                if let Some(role_ids) = &filter.role_ids
                    && !role_ids.contains(assignment.role_id.as_str())
                {
                    return false;
                }
                if let Some(permission_ids) = &filter.permission_ids
                    && !permission_ids.contains(assignment.permission_id.as_str())
                {
                    return false;
                }

                let permission =
                    permissions.get(&(tenant_id, assignment.permission_id.clone()));
                if let Some(app_ids) = &filter.app_ids {
                    let Some(permission) = permission else {
                        return false;
                    };
                    if !app_ids.contains(permission.app_id.as_str()) {
                        return false;
                    }
                }
                if let Some(product_names) = &filter.product_names {
                    let Some(product) =
                        permission.and_then(|permission| permission.product_name.as_deref())
                    else {
                        return false;
                    };
                    if !product_names.contains(product) {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();
        matching.sort_by_key(|assignment| assignment.id);

        let total_count = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.size() as usize)
            .collect();

        Ok(Page {
            items,
            total_count,
            number: page.number(),
            size: page.size(),
        })
    }
}
