//! Project persistence

mod in_memory_repository;
mod pg_repository;

pub use in_memory_repository::InMemoryProjectRepository;
pub use pg_repository::PgProjectRepository;
