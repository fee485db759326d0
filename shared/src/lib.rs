//! Shared types for the Site Manager scaffold fetcher: request/report models,
//! the error taxonomy, lifecycle events and host configuration.
pub mod errors;
pub mod events;
pub mod host_config;
pub mod models;
