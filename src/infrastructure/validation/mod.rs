//! Validation persistence

mod in_memory_repository;
mod pg_repository;

pub use in_memory_repository::InMemoryValidationRepository;
pub use pg_repository::PgValidationRepository;
