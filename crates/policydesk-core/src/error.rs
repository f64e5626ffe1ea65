//! Error types for policydesk core parsing.

use thiserror::Error;

/// A status filter string that is not one of `active`, `expiring`, `expired`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown policy status: {0:?} (expected active, expiring or expired)")]
pub struct ParseStatusError(pub String);
