//! Application state: the two record snapshots and the active filter.
//!
//! Snapshots are replaced wholesale, never patched. Every fetch takes a
//! [`FetchTicket`] before it goes out. A response is applied only when
//! its ticket is newer than the last one applied to that snapshot, so a
//! slow, older response can't overwrite newer data.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use policydesk_core::{PolicyRecord, SalespersonRecord};

use crate::filter::PolicyFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Policies,
    Salespeople,
}

impl FetchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchKind::Policies => "policies",
            FetchKind::Salespeople => "salespeople",
        }
    }
}

/// Issued when a fetch starts, redeemed when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: FetchKind,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    records: Vec<T>,
    /// Last generation handed out.
    issued: u64,
    /// Generation of the records currently held; 0 before the first load.
    applied: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issued: 0,
            applied: 0,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn is_loaded(&self) -> bool {
        self.applied > 0
    }

    pub fn generation(&self) -> u64 {
        self.applied
    }

    fn next_generation(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Swap in `records` if `generation` is newer than what's held.
    fn replace(&mut self, generation: u64, records: Vec<T>) -> bool {
        if generation <= self.applied {
            return false;
        }
        self.records = records;
        self.applied = generation;
        true
    }
}

/// Coarse page state, as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    NoData,
    Loaded,
    Filtered,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    policies: Snapshot<PolicyRecord>,
    salespeople: Snapshot<SalespersonRecord>,
    pub filter: PolicyFilter,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self, kind: FetchKind) -> FetchTicket {
        let generation = match kind {
            FetchKind::Policies => self.policies.next_generation(),
            FetchKind::Salespeople => self.salespeople.next_generation(),
        };
        debug!(kind = kind.as_str(), generation, "fetch started");
        FetchTicket { kind, generation }
    }

    /// Returns `false` when the ticket is stale or for another collection.
    pub fn replace_policies(&mut self, ticket: FetchTicket, records: Vec<PolicyRecord>) -> bool {
        if ticket.kind != FetchKind::Policies {
            return false;
        }
        let count = records.len();
        let applied = self.policies.replace(ticket.generation, records);
        log_replace(ticket, applied, self.policies.generation(), count);
        applied
    }

    /// Returns `false` when the ticket is stale or for another collection.
    pub fn replace_salespeople(
        &mut self,
        ticket: FetchTicket,
        records: Vec<SalespersonRecord>,
    ) -> bool {
        if ticket.kind != FetchKind::Salespeople {
            return false;
        }
        let count = records.len();
        let applied = self.salespeople.replace(ticket.generation, records);
        log_replace(ticket, applied, self.salespeople.generation(), count);
        applied
    }

    pub fn policies(&self) -> &Snapshot<PolicyRecord> {
        &self.policies
    }

    pub fn salespeople(&self) -> &Snapshot<SalespersonRecord> {
        &self.salespeople
    }

    /// The policies the table should show right now.
    pub fn visible_policies(&self, now: DateTime<Utc>, window: TimeDelta) -> Vec<PolicyRecord> {
        if self.filter.is_empty() {
            return self.policies.records().to_vec();
        }
        self.filter.apply(self.policies.records(), now, window)
    }

    pub fn phase(&self) -> ViewPhase {
        if !self.policies.is_loaded() {
            ViewPhase::NoData
        } else if self.filter.is_empty() {
            ViewPhase::Loaded
        } else {
            ViewPhase::Filtered
        }
    }
}

fn log_replace(ticket: FetchTicket, applied: bool, current: u64, count: usize) {
    if applied {
        debug!(
            kind = ticket.kind.as_str(),
            generation = ticket.generation,
            count,
            "snapshot replaced"
        );
    } else {
        warn!(
            kind = ticket.kind.as_str(),
            generation = ticket.generation,
            current,
            "dropping stale response"
        );
    }
}
