use std::sync::Arc;

use permitra_core::{AppError, AppResult, TenantId};
use permitra_domain::{Assignment, AssignmentId};

use crate::assignment_ports::{AssignmentRepository, ReferenceRepository};

mod grant;
mod revoke;
mod search;


/// Application service for assignment grant, revoke, and search workflows.
///
/// Stateless between calls; all shared state lives behind the repositories.
#[derive(Clone)]
pub struct AssignmentService {
    references: Arc<dyn ReferenceRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

impl AssignmentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        references: Arc<dyn ReferenceRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            references,
            assignments,
        }
    }

    /// Returns one assignment by identifier.
    pub async fn get_assignment(
        &self,
        tenant_id: TenantId,
        id: AssignmentId,
    ) -> AppResult<Assignment> {
        self.assignments
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("assignment '{id}' was not found")))
    }

    /// Deletes one assignment by identifier. Deleting an absent row succeeds.
    pub async fn delete_assignment(&self, tenant_id: TenantId, id: AssignmentId) -> AppResult<()> {
        self.assignments.delete_by_id(tenant_id, id).await?;
        Ok(())
    }
}

fn required_identifier(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!(
            "{field} must not be blank"
        )));
    }

    Ok(trimmed.to_owned())
}
