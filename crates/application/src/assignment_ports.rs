use std::collections::BTreeSet;

use async_trait::async_trait;

use permitra_core::{AppResult, TenantId};
use permitra_domain::{
    App, Assignment, AssignmentFilter, AssignmentId, Page, PageRequest, Permission, Role,
};

/// Input payload for app-scoped or product-scoped grants.
///
/// Exactly one of `app_id` / `product_names` must be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantAssignmentsInput {
    /// Role receiving the grants.
    pub role_id: String,
    /// Application whose permissions are granted.
    pub app_id: Option<String>,
    /// Products whose permissions are granted.
    pub product_names: Option<Vec<String>>,
}

/// Input payload for criteria-driven revokes.
///
/// Only `role_id` is required; the most specific populated dimension narrows
/// the deleted permission set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeAssignmentsInput {
    /// Role whose assignments are revoked.
    pub role_id: String,
    /// Restricts the revoke to a single permission.
    pub permission_id: Option<String>,
    /// Restricts the revoke to permissions of one application.
    pub app_id: Option<String>,
    /// Restricts the revoke to permissions of the given products.
    pub product_names: Option<Vec<String>>,
}

/// Read-only port for role, permission, app, and product reference data.
///
/// Every lookup is tenant-scoped; cross-tenant references never resolve.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Resolves a role by identifier.
    async fn find_role(&self, tenant_id: TenantId, role_id: &str) -> AppResult<Option<Role>>;

    /// Resolves a permission by identifier.
    async fn find_permission(
        &self,
        tenant_id: TenantId,
        permission_id: &str,
    ) -> AppResult<Option<Permission>>;

    /// Resolves an application by identifier.
    async fn find_app(&self, tenant_id: TenantId, app_id: &str) -> AppResult<Option<App>>;

    /// Lists permissions belonging to one application.
    async fn list_permissions_by_app(
        &self,
        tenant_id: TenantId,
        app_id: &str,
    ) -> AppResult<Vec<Permission>>;

    /// Lists permissions belonging to any of the given products.
    async fn list_permissions_by_products(
        &self,
        tenant_id: TenantId,
        product_names: &BTreeSet<String>,
    ) -> AppResult<Vec<Permission>>;
}

/// Port owning assignment persistence.
///
/// Adapters enforce the `(permission_id, role_id, tenant_id)` uniqueness
/// constraint and run batch mutations atomically.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts one assignment; a duplicate triple is a conflict.
    async fn insert(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<Assignment>;

    /// Inserts the pairs not yet present, atomically, returning created rows.
    async fn insert_missing(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: &BTreeSet<String>,
    ) -> AppResult<Vec<Assignment>>;

    /// Finds an assignment by identifier.
    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: AssignmentId,
    ) -> AppResult<Option<Assignment>>;

    /// Deletes by identifier; returns whether a row was removed.
    async fn delete_by_id(&self, tenant_id: TenantId, id: AssignmentId) -> AppResult<bool>;

    /// Deletes all assignments of a role, optionally restricted to a
    /// permission set; returns the number of deleted rows.
    async fn delete_for_role(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: Option<&BTreeSet<String>>,
    ) -> AppResult<u64>;

    /// Returns the page of assignments matching the filter, ordered by
    /// assignment id, with a pagination-independent total count.
    async fn search(
        &self,
        tenant_id: TenantId,
        filter: &AssignmentFilter,
        page: PageRequest,
    ) -> AppResult<Page<Assignment>>;
}
