use super::*;

use std::collections::BTreeSet;

use permitra_domain::normalize_identifiers;

use crate::assignment_ports::GrantAssignmentsInput;

impl AssignmentService {
    /// Creates a single assignment linking one permission to one role.
    ///
    /// Both references must resolve in tenant scope; an existing
    /// `(permission, role)` pair is a conflict. The resolution pre-check gives
    /// callers the NotFound/Conflict split, while the store's uniqueness
    /// constraint stays the final arbiter under concurrent inserts.
    pub async fn create_assignment(
        &self,
        tenant_id: TenantId,
        permission_id: &str,
        role_id: &str,
    ) -> AppResult<Assignment> {
        let permission_id = required_identifier(permission_id, "permission_id")?;
        let role_id = required_identifier(role_id, "role_id")?;

        self.references
            .find_permission(tenant_id, permission_id.as_str())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })?;

        self.references
            .find_role(tenant_id, role_id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        self.assignments
            .insert(tenant_id, role_id.as_str(), permission_id.as_str())
            .await
    }

    /// Grants every permission of one app or of one product list to a role.
    ///
    /// Pairs that already exist are skipped; the call fails with a conflict
    /// only when nothing new was created. Replaying the same request against
    /// an unchanged store never duplicates rows.
    pub async fn grant_by_app_or_products(
        &self,
        tenant_id: TenantId,
        input: GrantAssignmentsInput,
    ) -> AppResult<Vec<Assignment>> {
        let role_id = required_identifier(input.role_id.as_str(), "role_id")?;

        let app_id = input
            .app_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if app_id.is_some() == input.product_names.is_some() {
            return Err(AppError::Validation(
                "exactly one of app_id and product_names must be set".to_owned(),
            ));
        }

        self.references
            .find_role(tenant_id, role_id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let candidates = match app_id {
            Some(app_id) => self.permissions_for_app(tenant_id, app_id).await?,
            None => {
                self.permissions_for_products(tenant_id, input.product_names.as_deref())
                    .await?
            }
        };

        let created = self
            .assignments
            .insert_missing(tenant_id, role_id.as_str(), &candidates)
            .await?;

        if created.is_empty() {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' already holds every requested permission"
            )));
        }

        Ok(created)
    }

    async fn permissions_for_app(
        &self,
        tenant_id: TenantId,
        app_id: &str,
    ) -> AppResult<BTreeSet<String>> {
        self.references
            .find_app(tenant_id, app_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("app '{app_id}' was not found")))?;

        let permissions = self.references.list_permissions_by_app(tenant_id, app_id).await?;
        if permissions.is_empty() {
            return Err(AppError::NotFound(format!(
                "no permissions found for app '{app_id}'"
            )));
        }

        Ok(permissions
            .into_iter()
            .map(|permission| permission.permission_id)
            .collect())
    }

    async fn permissions_for_products(
        &self,
        tenant_id: TenantId,
        product_names: Option<&[String]>,
    ) -> AppResult<BTreeSet<String>> {
        let Some(names) = normalize_identifiers(product_names) else {
            return Err(AppError::NotFound(
                "no permissions found for given product names".to_owned(),
            ));
        };

        let permissions = self
            .references
            .list_permissions_by_products(tenant_id, &names)
            .await?;
        if permissions.is_empty() {
            return Err(AppError::NotFound(
                "no permissions found for given product names".to_owned(),
            ));
        }

        Ok(permissions
            .into_iter()
            .map(|permission| permission.permission_id)
            .collect())
    }
}
