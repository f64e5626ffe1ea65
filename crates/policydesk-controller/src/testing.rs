//! Test doubles for the backend and view seams.
//!
//! Used by this crate's tests and by hosts that want to exercise the
//! controller without a server or a page.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use policydesk_client::{BackendFuture, ClientError, ClientResult, PolicyBackend};
use policydesk_core::{CreateResponse, NewPolicy, PolicyRecord, SalespersonRecord};
use policydesk_dashboard::{BannerId, BannerView, PolicyTable, SalespersonOptions};

use crate::view::PolicyView;

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Backend ─────────────────────────────────────────────────────

enum Scripted<T> {
    Ready(ClientResult<T>),
    Gated(oneshot::Receiver<ClientResult<T>>),
}

impl<T: Send + 'static> Scripted<T> {
    async fn resolve(self) -> ClientResult<T> {
        match self {
            Scripted::Ready(result) => result,
            Scripted::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Connect("gate dropped".to_string()))),
        }
    }
}

/// Scripted [`PolicyBackend`].
///
/// Queued responses are consumed in call order; once a queue is empty
/// the default collection (or a successful create) is returned.
#[derive(Default)]
pub struct FakeBackend {
    policies: Mutex<VecDeque<Scripted<Vec<PolicyRecord>>>>,
    salespeople: Mutex<VecDeque<Scripted<Vec<SalespersonRecord>>>>,
    creates: Mutex<VecDeque<ClientResult<CreateResponse>>>,
    default_policies: Mutex<Vec<PolicyRecord>>,
    default_salespeople: Mutex<Vec<SalespersonRecord>>,
    submitted: Mutex<Vec<NewPolicy>>,
    policy_fetches: AtomicUsize,
    salespeople_fetches: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection returned once the policy queue is empty.
    pub fn set_policies(&self, policies: Vec<PolicyRecord>) {
        *locked(&self.default_policies) = policies;
    }

    pub fn set_salespeople(&self, salespeople: Vec<SalespersonRecord>) {
        *locked(&self.default_salespeople) = salespeople;
    }

    pub fn push_policies(&self, result: ClientResult<Vec<PolicyRecord>>) {
        locked(&self.policies).push_back(Scripted::Ready(result));
    }

    pub fn push_salespeople(&self, result: ClientResult<Vec<SalespersonRecord>>) {
        locked(&self.salespeople).push_back(Scripted::Ready(result));
    }

    /// Queue a policy response that resolves when the returned sender fires.
    pub fn gate_policies(&self) -> oneshot::Sender<ClientResult<Vec<PolicyRecord>>> {
        let (tx, rx) = oneshot::channel();
        locked(&self.policies).push_back(Scripted::Gated(rx));
        tx
    }

    pub fn push_create(&self, result: ClientResult<CreateResponse>) {
        locked(&self.creates).push_back(result);
    }

    /// Every payload passed to `create_policy`, in order.
    pub fn submitted(&self) -> Vec<NewPolicy> {
        locked(&self.submitted).clone()
    }

    pub fn policy_fetches(&self) -> usize {
        self.policy_fetches.load(Ordering::SeqCst)
    }

    pub fn salespeople_fetches(&self) -> usize {
        self.salespeople_fetches.load(Ordering::SeqCst)
    }
}

impl PolicyBackend for FakeBackend {
    fn fetch_policies(&self) -> BackendFuture<'_, Vec<PolicyRecord>> {
        self.policy_fetches.fetch_add(1, Ordering::SeqCst);
        let next = locked(&self.policies).pop_front();
        let fallback = locked(&self.default_policies).clone();
        Box::pin(async move {
            match next {
                Some(scripted) => scripted.resolve().await,
                None => Ok(fallback),
            }
        })
    }

    fn fetch_salespeople(&self) -> BackendFuture<'_, Vec<SalespersonRecord>> {
        self.salespeople_fetches.fetch_add(1, Ordering::SeqCst);
        let next = locked(&self.salespeople).pop_front();
        let fallback = locked(&self.default_salespeople).clone();
        Box::pin(async move {
            match next {
                Some(scripted) => scripted.resolve().await,
                None => Ok(fallback),
            }
        })
    }

    fn create_policy<'a>(&'a self, policy: &'a NewPolicy) -> BackendFuture<'a, CreateResponse> {
        locked(&self.submitted).push(policy.clone());
        let next = locked(&self.creates).pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| {
                Ok(CreateResponse {
                    success: true,
                    error: None,
                    message: None,
                })
            })
        })
    }
}

// ── View ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Recorded {
    pub tables: Vec<PolicyTable>,
    pub option_sets: Vec<SalespersonOptions>,
    pub banners: Vec<BannerView>,
    pub removed: Vec<BannerId>,
}

/// [`PolicyView`] that records every call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_renders(&self) -> usize {
        locked(&self.inner).tables.len()
    }

    pub fn last_table(&self) -> Option<PolicyTable> {
        locked(&self.inner).tables.last().cloned()
    }

    /// Policy numbers shown by the most recent table render.
    pub fn last_policy_numbers(&self) -> Vec<String> {
        self.last_table()
            .map(|t| t.policy_rows().map(|r| r.policy_number.clone()).collect())
            .unwrap_or_default()
    }

    pub fn last_options(&self) -> Option<SalespersonOptions> {
        locked(&self.inner).option_sets.last().cloned()
    }

    /// Every banner ever appended.
    pub fn banners(&self) -> Vec<BannerView> {
        locked(&self.inner).banners.clone()
    }

    /// Banners appended and not yet removed.
    pub fn visible_banners(&self) -> Vec<BannerView> {
        let inner = locked(&self.inner);
        inner
            .banners
            .iter()
            .filter(|b| !inner.removed.contains(&b.id))
            .cloned()
            .collect()
    }
}

impl PolicyView for RecordingView {
    fn replace_table(&mut self, table: &PolicyTable) {
        locked(&self.inner).tables.push(table.clone());
    }

    fn replace_salesperson_options(&mut self, options: &SalespersonOptions) {
        locked(&self.inner).option_sets.push(options.clone());
    }

    fn append_banner(&mut self, banner: &BannerView) {
        locked(&self.inner).banners.push(banner.clone());
    }

    fn remove_banner(&mut self, id: BannerId) {
        locked(&self.inner).removed.push(id);
    }
}
