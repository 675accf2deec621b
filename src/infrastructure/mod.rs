//! Infrastructure layer - repositories, scorers, storage and services

pub mod artifact;
pub mod dataset;
pub mod db;
pub mod logging;
pub mod model;
pub mod project;
pub mod run;
pub mod scorer;
pub mod services;
pub mod validation;
