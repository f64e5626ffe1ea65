//! Record types exchanged with the policy backend.
//!
//! The client only ever holds read-only copies of these records. Every
//! field the backend may leave out is optional, and unknown fields are
//! ignored so schema additions on the server side don't break loading.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier for a record. Rows come back with either integer
/// or string keys depending on the table, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

// ── Policy ────────────────────────────────────────────────────────

/// A policy as returned by `GET /api/policies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// National ID of the customer. Matched case-sensitively by search.
    #[serde(default)]
    pub customer_tc: Option<String>,
    #[serde(default)]
    pub plate_number: Option<String>,
    /// Product category (e.g. "Trafik", "Kasko").
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub insurance_company: Option<String>,
    #[serde(default)]
    pub salesperson: Option<String>,
    /// Gross premium in TRY.
    #[serde(default, deserialize_with = "lenient_number")]
    pub gross_premium: Option<f64>,
    /// Coverage end date exactly as stored by the backend.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Envelope for `GET /api/policies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliciesEnvelope {
    #[serde(default)]
    pub policies: Option<Vec<PolicyRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Salesperson ───────────────────────────────────────────────────

/// A salesperson as returned by `GET /api/salespeople`.
///
/// The name doubles as the option value in the selector. A missing or
/// null name comes through as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalespersonRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl SalespersonRecord {
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }
}

/// Envelope for `GET /api/salespeople`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalespeopleEnvelope {
    #[serde(default)]
    pub salespeople: Option<Vec<SalespersonRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Create ────────────────────────────────────────────────────────

/// Body of `POST /api/policies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_premium: Option<f64>,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Response of `POST /api/policies`.
///
/// Rejections come back as `{ "error": "..." }`, usually without a
/// `success` field, so it defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accept a JSON number, a numeric string, or null. Anything else is
/// treated as absent rather than failing the whole collection.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accept a JSON string or number; anything else becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Treat `Some("")` the same as `None`.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
