//! Application services and ports for assignment management.

#![forbid(unsafe_code)]

mod assignment_ports;
mod assignment_service;

pub use assignment_ports::{
    AssignmentRepository, GrantAssignmentsInput, ReferenceRepository, RevokeAssignmentsInput,
};
pub use assignment_service::AssignmentService;
