use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use permitra_application::ReferenceRepository;
use permitra_core::{AppError, AppResult, TenantId};
use permitra_domain::{App, Permission, Role};

/// PostgreSQL-backed repository for role, permission, and app reference data.
#[derive(Clone)]
pub struct PostgresReferenceRepository {
    pool: PgPool,
}

impl PostgresReferenceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: String,
    name: Option<String>,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission_id: String,
    app_id: String,
    product_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct AppRow {
    app_id: String,
    product_name: Option<String>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            permission_id: row.permission_id,
            app_id: row.app_id,
            product_name: row.product_name,
        }
    }
}

#[async_trait]
impl ReferenceRepository for PostgresReferenceRepository {
    async fn find_role(&self, tenant_id: TenantId, role_id: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_id, name
            FROM roles
            WHERE tenant_id = $1 AND role_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        Ok(row.map(|row| Role {
            role_id: row.role_id,
            name: row.name,
        }))
    }

    async fn find_permission(
        &self,
        tenant_id: TenantId,
        permission_id: &str,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission_id, app_id, product_name
            FROM permissions
            WHERE tenant_id = $1 AND permission_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permission: {error}")))?;

        Ok(row.map(Permission::from))
    }

    async fn find_app(&self, tenant_id: TenantId, app_id: &str) -> AppResult<Option<App>> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT app_id, product_name
            FROM apps
            WHERE tenant_id = $1 AND app_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve app: {error}")))?;

        Ok(row.map(|row| App {
            app_id: row.app_id,
            product_name: row.product_name,
        }))
    }

    async fn list_permissions_by_app(
        &self,
        tenant_id: TenantId,
        app_id: &str,
    ) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission_id, app_id, product_name
            FROM permissions
            WHERE tenant_id = $1 AND app_id = $2
            ORDER BY permission_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(app_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions by app: {error}"))
        })?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn list_permissions_by_products(
        &self,
        tenant_id: TenantId,
        product_names: &BTreeSet<String>,
    ) -> AppResult<Vec<Permission>> {
        let names: Vec<String> = product_names.iter().cloned().collect();
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission_id, app_id, product_name
            FROM permissions
            WHERE tenant_id = $1 AND product_name = ANY($2)
            ORDER BY permission_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions by products: {error}"))
        })?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }
}
