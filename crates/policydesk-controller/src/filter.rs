//! Client-side search and filter predicates over the policy snapshot.
//!
//! All predicates are pure. A record is kept only when it satisfies
//! every predicate that is set, so the order they were set in doesn't
//! matter.

use chrono::{DateTime, TimeDelta, Utc};

use policydesk_core::{PolicyRecord, PolicyStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyFilter {
    /// Free-text search term. `None` matches everything.
    pub search: Option<String>,
    /// Exact product category.
    pub product: Option<String>,
    pub status: Option<PolicyStatus>,
}

impl PolicyFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.product.is_none() && self.status.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Set the search term; an empty string unsets it.
    pub fn set_search(&mut self, term: &str) {
        self.search = (!term.is_empty()).then(|| term.to_string());
    }

    /// Set the product category; an empty string unsets it.
    pub fn set_product(&mut self, product: Option<&str>) {
        self.product = product.filter(|p| !p.is_empty()).map(str::to_string);
    }

    pub fn matches(&self, policy: &PolicyRecord, now: DateTime<Utc>, window: TimeDelta) -> bool {
        if let Some(term) = &self.search {
            if !matches_search(policy, term) {
                return false;
            }
        }
        if let Some(product) = &self.product {
            if policy.product.as_deref() != Some(product.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if !status.matches_raw(policy.end_date.as_deref(), now, window) {
                return false;
            }
        }
        true
    }

    /// Matching records in snapshot order. The input is never modified.
    pub fn apply(
        &self,
        policies: &[PolicyRecord],
        now: DateTime<Utc>,
        window: TimeDelta,
    ) -> Vec<PolicyRecord> {
        policies
            .iter()
            .filter(|p| self.matches(p, now, window))
            .cloned()
            .collect()
    }
}

/// Case-insensitive on policy number, customer name and plate; exact
/// substring on the national ID.
pub fn matches_search(policy: &PolicyRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    let folded = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    };

    folded(&policy.policy_number)
        || folded(&policy.customer_name)
        || policy.customer_tc.as_deref().is_some_and(|tc| tc.contains(term))
        || folded(&policy.plate_number)
}
