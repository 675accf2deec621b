//! Application services

mod ingest_service;
mod run_executor;
mod run_scheduler;

pub use ingest_service::IngestService;
pub use run_executor::RunExecutor;
pub use run_scheduler::{
    RESULTS_DEFAULT_LIMIT, RESULTS_MAX_LIMIT, ResultsPage, RunScheduler,
};
