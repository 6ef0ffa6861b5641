use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use permitra_application::AssignmentRepository;
use permitra_core::{AppError, AppResult, TenantId};
use permitra_domain::{Assignment, AssignmentFilter, AssignmentId, Page, PageRequest};

/// PostgreSQL-backed repository for assignment rows.
///
/// The `uc_assignment_key` unique constraint on
/// `(permission_id, role_id, tenant_id)` is the final arbiter for duplicate
/// grants; violations surface as conflicts, never as raw store errors.
#[derive(Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: Uuid,
    tenant_id: Uuid,
    role_id: String,
    permission_id: String,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: AssignmentId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            role_id: row.role_id,
            permission_id: row.permission_id,
        }
    }
}

const FILTER_CLAUSE: &str = r#"
    tenant_id = $1
    AND ($2::text[] IS NULL OR role_id = ANY($2))
    AND ($3::text[] IS NULL OR permission_id = ANY($3))
    AND ($4::text[] IS NULL OR EXISTS (
        SELECT 1 FROM permissions
        WHERE permissions.tenant_id = assignments.tenant_id
            AND permissions.permission_id = assignments.permission_id
            AND permissions.app_id = ANY($4)
    ))
    AND ($5::text[] IS NULL OR EXISTS (
        SELECT 1 FROM permissions
        WHERE permissions.tenant_id = assignments.tenant_id
            AND permissions.permission_id = assignments.permission_id
            AND permissions.product_name = ANY($5)
    ))
"#;

fn as_vec(values: Option<&BTreeSet<String>>) -> Option<Vec<String>> {
    values.map(|set| set.iter().cloned().collect())
}

fn map_assignment_conflict(
    error: sqlx::Error,
    tenant_id: TenantId,
    role_id: &str,
    permission_id: &str,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "duplicate key value violates unique constraint 'uc_assignment_key': \
             key (permission_id, role_id, tenant_id)=({permission_id}, {role_id}, {tenant_id}) \
             already exists"
        ));
    }

    AppError::Internal(format!("failed to persist assignment: {error}"))
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn insert(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<Assignment> {
        let id = AssignmentId::new();

        sqlx::query(
            r#"
            INSERT INTO assignments (id, tenant_id, role_id, permission_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await
        .map_err(|error| map_assignment_conflict(error, tenant_id, role_id, permission_id))?;

        Ok(Assignment {
            id,
            tenant_id,
            role_id: role_id.to_owned(),
            permission_id: permission_id.to_owned(),
        })
    }

    async fn insert_missing(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: &BTreeSet<String>,
    ) -> AppResult<Vec<Assignment>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let candidates: Vec<String> = permission_ids.iter().cloned().collect();
        let existing: HashSet<String> = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission_id
            FROM assignments
            WHERE tenant_id = $1 AND role_id = $2 AND permission_id = ANY($3)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id)
        .bind(&candidates)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve existing assignments: {error}"))
        })?
        .into_iter()
        .collect();

        let mut created = Vec::new();
        for permission_id in permission_ids {
            if existing.contains(permission_id) {
                continue;
            }

            // Concurrent grants can slip between the existence read and this
            // insert; ON CONFLICT DO NOTHING lets the constraint decide.
            let id = AssignmentId::new();
            let inserted = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO assignments (id, tenant_id, role_id, permission_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT ON CONSTRAINT uc_assignment_key DO NOTHING
                RETURNING id
                "#,
            )
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .bind(role_id)
            .bind(permission_id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist assignment batch: {error}"))
            })?;

            if inserted.is_some() {
                created.push(Assignment {
                    id,
                    tenant_id,
                    role_id: role_id.to_owned(),
                    permission_id: permission_id.clone(),
                });
            }
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, tenant_id, role_id, permission_id
            FROM assignments
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find assignment: {error}")))?;

        Ok(row.map(Assignment::from))
    }

    async fn delete_by_id(&self, tenant_id: TenantId, id: AssignmentId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete assignment: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn delete_for_role(
        &self,
        tenant_id: TenantId,
        role_id: &str,
        permission_ids: Option<&BTreeSet<String>>,
    ) -> AppResult<u64> {
        let scope = as_vec(permission_ids);
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE tenant_id = $1
                AND role_id = $2
                AND ($3::text[] IS NULL OR permission_id = ANY($3))
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id)
        .bind(scope)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke assignments: {error}")))?
        .rows_affected();

        tracing::debug!(%tenant_id, role_id, rows_affected, "revoked assignments");
        Ok(rows_affected)
    }

    async fn search(
        &self,
        tenant_id: TenantId,
        filter: &AssignmentFilter,
        page: PageRequest,
    ) -> AppResult<Page<Assignment>> {
        let role_ids = as_vec(filter.role_ids.as_ref());
        let permission_ids = as_vec(filter.permission_ids.as_ref());
        let app_ids = as_vec(filter.app_ids.as_ref());
        let product_names = as_vec(filter.product_names.as_ref());

        let count_query = format!("SELECT COUNT(*) FROM assignments WHERE {FILTER_CLAUSE}");
        let total_count = sqlx::query_scalar::<_, i64>(count_query.as_str())
            .bind(tenant_id.as_uuid())
            .bind(role_ids.clone())
            .bind(permission_ids.clone())
            .bind(app_ids.clone())
            .bind(product_names.clone())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count assignments: {error}"))
            })?;

        let page_query = format!(
            r#"
            SELECT id, tenant_id, role_id, permission_id
            FROM assignments
            WHERE {FILTER_CLAUSE}
            ORDER BY id
            LIMIT $6 OFFSET $7
            "#
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(page_query.as_str())
            .bind(tenant_id.as_uuid())
            .bind(role_ids)
            .bind(permission_ids)
            .bind(app_ids)
            .bind(product_names)
            .bind(i64::from(page.size()))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to search assignments: {error}"))
            })?;

        Ok(Page {
            items: rows.into_iter().map(Assignment::from).collect(),
            total_count: u64::try_from(total_count).unwrap_or(0),
            number: page.number(),
            size: page.size(),
        })
    }
}
