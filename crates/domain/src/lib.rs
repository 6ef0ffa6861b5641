//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod criteria;
mod reference;

pub use assignment::{Assignment, AssignmentId};
pub use criteria::{
    AssignmentFilter, AssignmentSearchCriteria, DEFAULT_PAGE_SIZE, Page, PageRequest,
    normalize_identifiers,
};
pub use reference::{App, Permission, Role};
