//! One-shot MongoDB bootstrap for the RS485 data collection services.
//!
//! Provisions the `rs485_db` database: the `clients`, `devices` and
//! `device_data` collections, their indexes, and a `readWrite` service
//! account whose credentials come from the environment.
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): siblings import
//! shared types through the re-exports below rather than from each other's
//! internals.

pub mod accounts;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod report;
pub mod schema;

pub use bootstrap::{run, BootstrapOutcome};
pub use config::{AdminCredentials, Config, ConfigError, ReportFormat};
pub use report::SchemaReport;
pub use schema::{IndexSpec, SortOrder};
