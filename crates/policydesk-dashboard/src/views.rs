//! View types for template rendering.
//!
//! These types are purpose-built for Askama templates: they carry
//! pre-formatted strings so templates stay simple.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use policydesk_core::{PolicyRecord, SalespersonRecord, non_empty};

/// Shown for any absent value.
pub const PLACEHOLDER: &str = "-";

// ── Policy Table ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRowView {
    pub id: String,
    pub policy_number: String,
    pub customer_name: String,
    pub customer_tc: String,
    pub plate_number: String,
    pub product: String,
    pub insurance_company: String,
    pub salesperson: String,
    pub premium_display: String,
    pub end_date_display: String,
}

impl PolicyRowView {
    pub fn from_record(policy: &PolicyRecord) -> Self {
        Self {
            id: policy.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            policy_number: or_placeholder(&policy.policy_number),
            customer_name: or_placeholder(&policy.customer_name),
            customer_tc: or_placeholder(&policy.customer_tc),
            plate_number: or_placeholder(&policy.plate_number),
            product: or_placeholder(&policy.product),
            insurance_company: or_placeholder(&policy.insurance_company),
            salesperson: or_placeholder(&policy.salesperson),
            premium_display: format_currency(policy.gross_premium.unwrap_or(0.0)),
            end_date_display: format_date(policy.end_date.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRow {
    Policy(PolicyRowView),
    /// The single "no records" row shown for an empty collection.
    Empty,
}

/// Table body for `#policiesTable`, one row per record in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    pub rows: Vec<TableRow>,
}

impl PolicyTable {
    pub fn build(policies: &[PolicyRecord]) -> Self {
        if policies.is_empty() {
            return Self {
                rows: vec![TableRow::Empty],
            };
        }
        Self {
            rows: policies
                .iter()
                .map(|p| TableRow::Policy(PolicyRowView::from_record(p)))
                .collect(),
        }
    }

    pub fn is_empty_placeholder(&self) -> bool {
        matches!(self.rows.as_slice(), [TableRow::Empty])
    }

    /// Views of the real policy rows, skipping the placeholder.
    pub fn policy_rows(&self) -> impl Iterator<Item = &PolicyRowView> {
        self.rows.iter().filter_map(|row| match row {
            TableRow::Policy(view) => Some(view),
            TableRow::Empty => None,
        })
    }
}

// ── Salesperson Select ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Options for `#salespersonSelect`.
///
/// Always starts with an empty-valued placeholder; the rest follow the
/// input order without sorting or dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalespersonOptions {
    pub options: Vec<SelectOption>,
}

impl SalespersonOptions {
    pub const PLACEHOLDER_LABEL: &'static str = "Select";

    pub fn build(salespeople: &[SalespersonRecord]) -> Self {
        let mut options = Vec::with_capacity(salespeople.len() + 1);
        options.push(SelectOption {
            value: String::new(),
            label: Self::PLACEHOLDER_LABEL.to_string(),
        });
        options.extend(salespeople.iter().map(|s| SelectOption {
            value: s.name.clone(),
            label: if s.name.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                s.name.clone()
            },
        }));
        Self { options }
    }
}

// ── Notification Banner ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn alert_class(self) -> &'static str {
        match self {
            Severity::Info => "alert-info",
            Severity::Success => "alert-success",
            Severity::Error => "alert-danger",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Info => "info-circle",
            Severity::Success => "check-circle",
            Severity::Error => "exclamation-triangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BannerId(pub u64);

impl fmt::Display for BannerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub id: BannerId,
    pub severity: Severity,
    pub message: String,
}

// ── Format Helpers ──────────────────────────────────────────────

fn or_placeholder(field: &Option<String>) -> String {
    non_empty(field).unwrap_or(PLACEHOLDER).to_string()
}

/// Format a number the tr-TR way: `.` groups thousands, `,` separates
/// decimals, at most three fraction digits.
///
/// Rounding (half away from zero) works on the shortest decimal form of
/// the value, so `1.0005` becomes `1,001` even though the nearest `f64`
/// sits just below it.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let (int_digits, frac_digits) = round_decimal(&value.abs().to_string(), 3);

    let mut out = String::new();
    if value < 0.0 && (int_digits != "0" || !frac_digits.is_empty()) {
        out.push('-');
    }
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (int_digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if !frac_digits.is_empty() {
        out.push(',');
        out.push_str(&frac_digits);
    }
    out
}

/// Round a plain non-negative decimal string to `places` fraction digits.
///
/// Returns the integer digits and the fraction digits with trailing
/// zeros removed.
fn round_decimal(plain: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, ""));
    let round_up = frac_part.as_bytes().get(places).is_some_and(|d| *d >= b'5');

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(frac_part.bytes().take(places));
    digits.resize(int_part.len() + places, b'0');

    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let int_digits = String::from_utf8_lossy(&digits[..split]);
    let int_digits = match int_digits.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    };
    let frac_digits = String::from_utf8_lossy(&digits[split..])
        .trim_end_matches('0')
        .to_string();
    (int_digits, frac_digits)
}

pub fn format_currency(value: f64) -> String {
    format!("₺{}", format_number(value))
}

/// Format a backend date as `DD.MM.YYYY`.
///
/// Absent or blank dates show the placeholder; anything that doesn't
/// parse is shown as stored.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    match display_date(raw) {
        Some(date) => date.format("%d.%m.%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Calendar date as written, without shifting into another timezone.
fn display_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
