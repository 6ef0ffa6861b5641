use super::*;

use std::collections::BTreeSet;

use permitra_domain::normalize_identifiers;

use crate::assignment_ports::RevokeAssignmentsInput;

impl AssignmentService {
    /// Deletes assignments of a role matching the given criteria.
    ///
    /// The most specific populated dimension narrows the deleted permission
    /// set: `permission_id`, then `product_names`, then `app_id`; with none
    /// set, every assignment of the role is removed. Unknown roles, unknown
    /// products or apps, and zero matching rows are all no-op successes, so
    /// the call is safe to retry. Returns the number of deleted rows.
    pub async fn revoke_by_criteria(
        &self,
        tenant_id: TenantId,
        input: RevokeAssignmentsInput,
    ) -> AppResult<u64> {
        let role_id = required_identifier(input.role_id.as_str(), "role_id")?;

        let permission_id = input
            .permission_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let app_id = input
            .app_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let product_names = normalize_identifiers(input.product_names.as_deref());

        let scope = if let Some(permission_id) = permission_id {
            Some(BTreeSet::from([permission_id.to_owned()]))
        } else if let Some(names) = product_names {
            Some(
                self.references
                    .list_permissions_by_products(tenant_id, &names)
                    .await?
                    .into_iter()
                    .map(|permission| permission.permission_id)
                    .collect(),
            )
        } else if let Some(app_id) = app_id {
            Some(
                self.references
                    .list_permissions_by_app(tenant_id, app_id)
                    .await?
                    .into_iter()
                    .map(|permission| permission.permission_id)
                    .collect(),
            )
        } else {
            None
        };

        // A resolved-but-empty scope deletes nothing rather than everything.
        if let Some(permission_ids) = &scope
            && permission_ids.is_empty()
        {
            return Ok(0);
        }

        self.assignments
            .delete_for_role(tenant_id, role_id.as_str(), scope.as_ref())
            .await
    }
}
