//! Model persistence

mod in_memory_repository;
mod pg_repository;

pub use in_memory_repository::InMemoryModelRepository;
pub use pg_repository::PgModelRepository;
