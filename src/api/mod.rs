//! API layer - HTTP endpoints

pub mod datasets;
pub mod health;
pub mod models;
pub mod projects;
pub mod router;
pub mod runs;
pub mod state;
pub mod types;
pub mod validations;

pub use router::create_router;
pub use state::AppState;
