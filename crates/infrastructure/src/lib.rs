//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_assignment_store;
mod postgres;
mod postgres_assignment_repository;
mod postgres_reference_repository;

pub use in_memory_assignment_store::InMemoryAssignmentStore;
pub use postgres::{PostgresStoreConfig, connect_and_migrate};
pub use postgres_assignment_repository::PostgresAssignmentRepository;
pub use postgres_reference_repository::PostgresReferenceRepository;
