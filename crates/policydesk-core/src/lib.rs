//! policydesk-core: shared types for the policy administration client.
//!
//! Holds the record shapes returned by the backend (`PolicyRecord`,
//! `SalespersonRecord`), the create payload (`NewPolicy`), the
//! end-date status rules used by the filter engine, and the
//! `policydesk.toml` configuration.

pub mod config;
pub mod error;
pub mod status;
pub mod types;

pub use config::DeskConfig;
pub use error::ParseStatusError;
pub use status::{PolicyStatus, parse_end_date};
pub use types::*;
