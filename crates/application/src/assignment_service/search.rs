use super::*;

use permitra_domain::{AssignmentSearchCriteria, Page, PageRequest};

impl AssignmentService {
    /// Returns the page of tenant assignments matching the criteria.
    ///
    /// Each dimension is normalized independently, so a filter holding only
    /// blank values behaves exactly like an absent filter. Empty criteria
    /// return every assignment of the tenant.
    pub async fn search_assignments(
        &self,
        tenant_id: TenantId,
        criteria: &AssignmentSearchCriteria,
        page: PageRequest,
    ) -> AppResult<Page<Assignment>> {
        let filter = criteria.normalize();
        self.assignments.search(tenant_id, &filter, page).await
    }
}
