//! Dataset persistence

mod in_memory_repository;
mod pg_repository;

pub use in_memory_repository::InMemoryDatasetRepository;
pub use pg_repository::PgDatasetRepository;
