//! Run persistence

mod in_memory_repository;
mod pg_repository;

pub use in_memory_repository::InMemoryRunRepository;
pub use pg_repository::PgRunRepository;
