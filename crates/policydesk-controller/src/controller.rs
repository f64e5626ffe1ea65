//! The view controller: load, render, filter, re-render.
//!
//! Every operation catches its own failures: loads log and raise an
//! error banner, creates report `false`, and nothing propagates to the
//! caller as an error.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, error, info, warn};

use policydesk_client::PolicyBackend;
use policydesk_core::config::UiConfig;
use policydesk_core::{NewPolicy, PolicyRecord, PolicyStatus, SalespersonRecord};
use policydesk_dashboard::{BannerId, PolicyTable, SalespersonOptions, Severity};

use crate::clock::Clock;
use crate::debounce::Debouncer;
use crate::filter::PolicyFilter;
use crate::notify::NotificationCenter;
use crate::state::{AppState, FetchKind, ViewPhase};
use crate::view::PolicyView;

const LOAD_POLICIES_FAILED: &str = "Failed to load policies!";
const LOAD_SALESPEOPLE_FAILED: &str = "Failed to load salespeople!";
const POLICY_ADDED: &str = "Policy added successfully!";
const POLICY_ADD_FAILED: &str = "An error occurred while adding the policy!";
const VIEW_COMING_SOON: &str = "Policy details are coming soon!";
const EDIT_COMING_SOON: &str = "Policy editing is coming soon!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub search_debounce: Duration,
    pub notification_ttl: Duration,
    pub expiring_window: TimeDelta,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_ui(&UiConfig::default())
    }
}

impl ControllerSettings {
    pub fn from_ui(ui: &UiConfig) -> Self {
        Self {
            search_debounce: ui.search_debounce(),
            notification_ttl: ui.notification_ttl(),
            expiring_window: ui.expiring_window(),
        }
    }
}

/// What happened to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was replaced and re-rendered.
    Applied,
    /// A newer response had already been applied; this one was dropped.
    Stale,
    /// The fetch failed; the snapshot is untouched.
    Failed,
}

pub struct ViewController<B, V, C> {
    backend: B,
    view: Mutex<V>,
    clock: C,
    settings: ControllerSettings,
    state: RwLock<AppState>,
    search: Mutex<Debouncer<String>>,
    notices: Mutex<NotificationCenter>,
}

impl<B, V, C> ViewController<B, V, C>
where
    B: PolicyBackend,
    V: PolicyView,
    C: Clock,
{
    pub fn new(backend: B, view: V, clock: C, settings: ControllerSettings) -> Self {
        Self {
            backend,
            view: Mutex::new(view),
            clock,
            settings,
            state: RwLock::new(AppState::new()),
            search: Mutex::new(Debouncer::new(settings.search_debounce)),
            notices: Mutex::new(NotificationCenter::new(settings.notification_ttl)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Borrow the view, e.g. to read back what was rendered.
    pub async fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().await
    }

    // ── Loading ─────────────────────────────────────────────────

    /// Fetch both collections concurrently. Each one lands on its own.
    pub async fn load_initial(&self) -> (LoadOutcome, LoadOutcome) {
        tokio::join!(self.load_policies(), self.load_salespeople())
    }

    /// Refetch the policy snapshot. An applied refresh drops any filter
    /// or pending search and shows the whole new snapshot.
    pub async fn load_policies(&self) -> LoadOutcome {
        let ticket = self.state.write().await.begin_fetch(FetchKind::Policies);

        let records = match self.backend.fetch_policies().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, generation = ticket.generation, "loading policies failed");
                self.notify(LOAD_POLICIES_FAILED, Severity::Error).await;
                return LoadOutcome::Failed;
            }
        };

        let count = records.len();
        {
            let mut state = self.state.write().await;
            if !state.replace_policies(ticket, records) {
                return LoadOutcome::Stale;
            }
            // A fresh snapshot is shown unfiltered.
            if !state.filter.is_empty() {
                debug!(filter = ?state.filter, "refresh clears active filters");
                state.filter.clear();
            }
        }
        self.search.lock().await.cancel();
        info!(count, "policies loaded");
        self.render_table().await;
        LoadOutcome::Applied
    }

    pub async fn load_salespeople(&self) -> LoadOutcome {
        let ticket = self.state.write().await.begin_fetch(FetchKind::Salespeople);

        let records = match self.backend.fetch_salespeople().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, generation = ticket.generation, "loading salespeople failed");
                self.notify(LOAD_SALESPEOPLE_FAILED, Severity::Error).await;
                return LoadOutcome::Failed;
            }
        };

        let count = records.len();
        let options = {
            let mut state = self.state.write().await;
            if !state.replace_salespeople(ticket, records) {
                return LoadOutcome::Stale;
            }
            SalespersonOptions::build(state.salespeople().records())
        };
        info!(count, "salespeople loaded");
        self.view.lock().await.replace_salesperson_options(&options);
        LoadOutcome::Applied
    }

    // ── Search & Filters ────────────────────────────────────────

    /// Record a keystroke in the search box. The search itself runs from
    /// [`tick`](Self::tick) once input has been quiet long enough.
    pub async fn on_search_input(&self, term: &str) {
        let now = self.clock.now();
        self.search.lock().await.trigger(term.to_string(), now);
    }

    /// Apply a search term right away, bypassing the debounce.
    pub async fn search(&self, term: &str) {
        self.search.lock().await.cancel();
        self.apply_search(term).await;
    }

    async fn apply_search(&self, term: &str) {
        debug!(term, "applying search");
        self.state.write().await.filter.set_search(term);
        self.render_table().await;
    }

    pub async fn set_product_filter(&self, product: Option<&str>) {
        self.state.write().await.filter.set_product(product);
        self.render_table().await;
    }

    pub async fn set_status_filter(&self, status: Option<PolicyStatus>) {
        self.state.write().await.filter.status = status;
        self.render_table().await;
    }

    /// Drop every predicate (and any pending search) and show the full
    /// current snapshot. Does not refetch.
    pub async fn clear_filters(&self) {
        self.search.lock().await.cancel();
        self.state.write().await.filter.clear();
        self.render_table().await;
    }

    // ── Timers ──────────────────────────────────────────────────

    /// Fire a due debounced search and expire old banners.
    pub async fn tick(&self) {
        let now = self.clock.now();

        let due = self.search.lock().await.poll(now);
        if let Some(term) = due {
            self.apply_search(&term).await;
        }

        let expired = self.notices.lock().await.expire(now);
        if !expired.is_empty() {
            let mut view = self.view.lock().await;
            for id in expired {
                view.remove_banner(id);
            }
        }
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub async fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let search = self.search.lock().await.deadline();
        let banner = self.notices.lock().await.next_expiry();
        match (search, banner) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Create ──────────────────────────────────────────────────

    /// Submit a new policy. On success the policy snapshot is refetched;
    /// on any failure it is left as it was.
    pub async fn submit_policy(&self, policy: &NewPolicy) -> bool {
        match self.backend.create_policy(policy).await {
            Ok(resp) if resp.success => {
                info!(policy_number = ?policy.policy_number, "policy created");
                self.notify(POLICY_ADDED, Severity::Success).await;
                self.load_policies().await;
                true
            }
            Ok(resp) => {
                let reason = resp.error.as_deref().unwrap_or("policy could not be added");
                warn!(reason, "policy create rejected");
                self.notify(&format!("Error: {reason}"), Severity::Error).await;
                false
            }
            Err(e) => {
                error!(error = %e, "policy create failed");
                let message = match e.server_message() {
                    Some(msg) => format!("Error: {msg}"),
                    None => POLICY_ADD_FAILED.to_string(),
                };
                self.notify(&message, Severity::Error).await;
                false
            }
        }
    }

    // ── Row Actions ─────────────────────────────────────────────

    pub async fn view_policy(&self, id: &str) -> BannerId {
        debug!(id, "view requested");
        self.notify(VIEW_COMING_SOON, Severity::Info).await
    }

    pub async fn edit_policy(&self, id: &str) -> BannerId {
        debug!(id, "edit requested");
        self.notify(EDIT_COMING_SOON, Severity::Info).await
    }

    pub async fn request_export(&self, format: &str) -> BannerId {
        let message = format!("{} export is coming soon!", format.to_uppercase());
        self.notify(&message, Severity::Info).await
    }

    // ── Notifications ───────────────────────────────────────────

    pub async fn notify(&self, message: &str, severity: Severity) -> BannerId {
        let now = self.clock.now();
        let banner = self.notices.lock().await.show(message, severity, now);
        self.view.lock().await.append_banner(&banner);
        banner.id
    }

    pub async fn dismiss_notification(&self, id: BannerId) {
        if self.notices.lock().await.dismiss(id) {
            self.view.lock().await.remove_banner(id);
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub async fn policies(&self) -> Vec<PolicyRecord> {
        self.state.read().await.policies().records().to_vec()
    }

    pub async fn salespeople(&self) -> Vec<SalespersonRecord> {
        self.state.read().await.salespeople().records().to_vec()
    }

    pub async fn visible_policies(&self) -> Vec<PolicyRecord> {
        let now = self.clock.now();
        self.state
            .read()
            .await
            .visible_policies(now, self.settings.expiring_window)
    }

    pub async fn filter(&self) -> PolicyFilter {
        self.state.read().await.filter.clone()
    }

    pub async fn phase(&self) -> ViewPhase {
        self.state.read().await.phase()
    }

    async fn render_table(&self) {
        let table = PolicyTable::build(&self.visible_policies().await);
        debug!(rows = table.rows.len(), "rendering policy table");
        self.view.lock().await.replace_table(&table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use policydesk_client::ClientError;
    use policydesk_core::{CreateResponse, RecordId};

    use crate::clock::ManualClock;
    use crate::testing::{FakeBackend, RecordingView};

    type TestController = ViewController<Arc<FakeBackend>, RecordingView, ManualClock>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn policy(id: i64, number: &str, end_in_days: Option<i64>) -> PolicyRecord {
        PolicyRecord {
            id: Some(RecordId::Int(id)),
            policy_number: Some(number.to_string()),
            customer_name: Some(format!("Customer {id}")),
            product: Some(if id % 2 == 0 { "Kasko" } else { "Trafik" }.to_string()),
            end_date: end_in_days.map(|d| (t0() + TimeDelta::days(d)).to_rfc3339()),
            ..Default::default()
        }
    }

    fn setup() -> (TestController, Arc<FakeBackend>, RecordingView, ManualClock) {
        let backend = Arc::new(FakeBackend::new());
        let view = RecordingView::new();
        let clock = ManualClock::new(t0());
        let controller = ViewController::new(
            backend.clone(),
            view.clone(),
            clock.clone(),
            ControllerSettings::default(),
        );
        (controller, backend, view, clock)
    }

    #[tokio::test]
    async fn initial_load_renders_both_collections() {
        let (ctl, backend, view, _) = setup();
        backend.set_policies(vec![policy(1, "TRF-1", Some(3)), policy(2, "KSK-2", None)]);
        backend.set_salespeople(vec![
            SalespersonRecord::named("Zeynep"),
            SalespersonRecord::named("Ali"),
        ]);

        assert_eq!(ctl.phase().await, ViewPhase::NoData);
        let (p, s) = ctl.load_initial().await;
        assert_eq!((p, s), (LoadOutcome::Applied, LoadOutcome::Applied));

        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2"]);
        let options = view.last_options().unwrap();
        let values: Vec<_> = options.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["", "Zeynep", "Ali"]);
        assert_eq!(ctl.phase().await, ViewPhase::Loaded);
        assert_eq!(ctl.backend().policy_fetches(), 1);
        assert_eq!(ctl.backend().salespeople_fetches(), 1);
    }

    #[tokio::test]
    async fn failed_load_keeps_snapshot_and_notifies() {
        let (ctl, backend, view, _) = setup();
        backend.push_policies(Ok(vec![policy(1, "TRF-1", None)]));
        backend.push_policies(Err(ClientError::Connect("refused".to_string())));

        assert_eq!(ctl.load_policies().await, LoadOutcome::Applied);
        let renders = view.table_renders();

        assert_eq!(ctl.load_policies().await, LoadOutcome::Failed);
        assert_eq!(ctl.policies().await, vec![policy(1, "TRF-1", None)]);
        assert_eq!(view.table_renders(), renders);

        let banners = view.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].severity, Severity::Error);
        assert_eq!(banners[0].message, LOAD_POLICIES_FAILED);
    }

    #[tokio::test]
    async fn stale_policy_response_does_not_win() {
        let (ctl, backend, view, _) = setup();
        let older = backend.gate_policies();
        let newer = backend.gate_policies();

        let (first, second, ()) = tokio::join!(ctl.load_policies(), ctl.load_policies(), async {
            newer.send(Ok(vec![policy(2, "NEW", None)])).ok();
            tokio::task::yield_now().await;
            older.send(Ok(vec![policy(1, "OLD", None)])).ok();
        });

        // Whichever order they resolved in, the newer request's data wins.
        assert_eq!(ctl.policies().await, vec![policy(2, "NEW", None)]);
        assert_eq!(view.last_policy_numbers(), vec!["NEW"]);
        assert_eq!(second, LoadOutcome::Applied);
        assert!(matches!(first, LoadOutcome::Applied | LoadOutcome::Stale));
    }

    #[tokio::test]
    async fn debounced_search_runs_once_with_last_value() {
        let (ctl, backend, view, clock) = setup();
        backend.set_policies(vec![
            policy(1, "TRF-100", None),
            policy(2, "KSK-200", None),
            policy(3, "TRF-300", None),
        ]);
        ctl.load_policies().await;
        let renders = view.table_renders();

        for term in ["t", "tr", "trf", "trf-", "trf-3"] {
            ctl.on_search_input(term).await;
            ctl.tick().await;
            clock.advance(Duration::from_millis(50));
        }
        assert_eq!(view.table_renders(), renders);

        // Last keystroke was at +200ms; deadline is +500ms.
        clock.set(t0() + TimeDelta::milliseconds(499));
        ctl.tick().await;
        assert_eq!(view.table_renders(), renders);

        clock.set(t0() + TimeDelta::milliseconds(500));
        ctl.tick().await;
        clock.advance(Duration::from_secs(1));
        ctl.tick().await;

        assert_eq!(view.table_renders(), renders + 1);
        assert_eq!(view.last_policy_numbers(), vec!["TRF-300"]);
        assert_eq!(ctl.filter().await.search.as_deref(), Some("trf-3"));
    }

    #[tokio::test]
    async fn next_deadline_tracks_search_and_banners() {
        let (ctl, _, _, clock) = setup();
        assert_eq!(ctl.next_deadline().await, None);

        ctl.notify("hello", Severity::Info).await;
        assert_eq!(ctl.next_deadline().await, Some(t0() + TimeDelta::seconds(5)));

        clock.advance(Duration::from_secs(1));
        ctl.on_search_input("abc").await;
        assert_eq!(
            ctl.next_deadline().await,
            Some(t0() + TimeDelta::milliseconds(1300))
        );
    }

    #[tokio::test]
    async fn filters_compose_and_clear_restores_order() {
        let (ctl, backend, view, _) = setup();
        let all = vec![
            policy(1, "TRF-1", Some(-1)),
            policy(2, "KSK-2", Some(5)),
            policy(3, "TRF-3", Some(60)),
            policy(4, "KSK-4", Some(60)),
        ];
        backend.set_policies(all.clone());
        ctl.load_policies().await;

        ctl.set_status_filter(Some(PolicyStatus::Active)).await;
        assert_eq!(view.last_policy_numbers(), vec!["TRF-3", "KSK-4"]);

        ctl.set_product_filter(Some("Kasko")).await;
        assert_eq!(view.last_policy_numbers(), vec!["KSK-4"]);

        ctl.search("trf").await;
        assert!(view.last_table().unwrap().is_empty_placeholder());
        assert_eq!(ctl.phase().await, ViewPhase::Filtered);

        let fetches = backend.policy_fetches();
        ctl.clear_filters().await;
        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2", "TRF-3", "KSK-4"]);
        assert_eq!(ctl.policies().await, all);
        assert_eq!(backend.policy_fetches(), fetches);
        assert_eq!(ctl.phase().await, ViewPhase::Loaded);
    }

    #[tokio::test]
    async fn clear_cancels_pending_search() {
        let (ctl, backend, view, clock) = setup();
        backend.set_policies(vec![policy(1, "TRF-1", None), policy(2, "KSK-2", None)]);
        ctl.load_policies().await;

        ctl.on_search_input("ksk").await;
        ctl.clear_filters().await;
        clock.advance(Duration::from_secs(1));
        ctl.tick().await;

        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2"]);
        assert!(ctl.filter().await.is_empty());
    }

    #[tokio::test]
    async fn successful_create_refetches() {
        let (ctl, backend, view, _) = setup();
        backend.push_policies(Ok(vec![policy(1, "TRF-1", None)]));
        ctl.load_policies().await;
        backend.set_policies(vec![policy(1, "TRF-1", None), policy(2, "KSK-2", None)]);

        let new = NewPolicy {
            policy_number: Some("KSK-2".to_string()),
            ..Default::default()
        };
        assert!(ctl.submit_policy(&new).await);

        assert_eq!(backend.submitted(), vec![new]);
        assert_eq!(backend.policy_fetches(), 2);
        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2"]);
        let banner = &view.banners()[0];
        assert_eq!(banner.severity, Severity::Success);
        assert_eq!(banner.message, POLICY_ADDED);
    }

    #[tokio::test]
    async fn refresh_after_create_shows_unfiltered_snapshot() {
        let (ctl, backend, view, _) = setup();
        backend.set_policies(vec![policy(1, "TRF-1", None), policy(2, "KSK-2", None)]);
        ctl.load_policies().await;

        ctl.set_product_filter(Some("Trafik")).await;
        assert_eq!(view.last_policy_numbers(), vec!["TRF-1"]);
        assert_eq!(ctl.phase().await, ViewPhase::Filtered);

        backend.set_policies(vec![
            policy(1, "TRF-1", None),
            policy(2, "KSK-2", None),
            policy(4, "KSK-4", None),
        ]);
        assert!(ctl.submit_policy(&NewPolicy::default()).await);

        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2", "KSK-4"]);
        assert_eq!(ctl.phase().await, ViewPhase::Loaded);
        assert!(ctl.filter().await.is_empty());
    }

    #[tokio::test]
    async fn reload_drops_pending_search() {
        let (ctl, backend, view, clock) = setup();
        backend.set_policies(vec![policy(1, "TRF-1", None), policy(2, "KSK-2", None)]);
        ctl.load_policies().await;

        ctl.set_status_filter(Some(PolicyStatus::Active)).await;
        ctl.on_search_input("ksk").await;
        assert_eq!(ctl.load_policies().await, LoadOutcome::Applied);
        let renders = view.table_renders();

        clock.advance(Duration::from_secs(1));
        ctl.tick().await;

        assert_eq!(view.table_renders(), renders);
        assert_eq!(view.last_policy_numbers(), vec!["TRF-1", "KSK-2"]);
        assert_eq!(ctl.phase().await, ViewPhase::Loaded);
        assert_eq!(ctl.next_deadline().await, None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_filter() {
        let (ctl, backend, view, _) = setup();
        backend.push_policies(Ok(vec![policy(1, "TRF-1", None), policy(2, "KSK-2", None)]));
        backend.push_policies(Err(ClientError::Connect("refused".to_string())));
        ctl.load_policies().await;

        ctl.search("ksk").await;
        assert_eq!(ctl.load_policies().await, LoadOutcome::Failed);
        assert_eq!(view.last_policy_numbers(), vec!["KSK-2"]);
        assert_eq!(ctl.phase().await, ViewPhase::Filtered);
    }

    #[tokio::test]
    async fn rejected_create_leaves_snapshot_alone() {
        let (ctl, backend, view, _) = setup();
        backend.set_policies(vec![policy(1, "TRF-1", Some(10))]);
        ctl.load_policies().await;
        let before = ctl.policies().await;
        let renders = view.table_renders();

        backend.push_create(Ok(CreateResponse {
            success: false,
            error: Some("duplicate policy number".to_string()),
            message: None,
        }));
        assert!(!ctl.submit_policy(&NewPolicy::default()).await);

        assert_eq!(ctl.policies().await, before);
        assert_eq!(view.table_renders(), renders);
        assert_eq!(backend.policy_fetches(), 1);
        let banner = &view.banners()[0];
        assert_eq!(banner.severity, Severity::Error);
        assert_eq!(banner.message, "Error: duplicate policy number");
    }

    #[tokio::test]
    async fn transport_failure_on_create() {
        let (ctl, backend, view, _) = setup();

        backend.push_create(Err(ClientError::Connect("refused".to_string())));
        assert!(!ctl.submit_policy(&NewPolicy::default()).await);
        assert_eq!(view.banners()[0].message, POLICY_ADD_FAILED);

        backend.push_create(Err(ClientError::Status {
            status: 401,
            message: Some("Unauthorized".to_string()),
        }));
        assert!(!ctl.submit_policy(&NewPolicy::default()).await);
        assert_eq!(view.banners()[1].message, "Error: Unauthorized");
        assert_eq!(view.table_renders(), 0);
    }

    #[tokio::test]
    async fn row_actions_are_coming_soon_banners() {
        let (ctl, _, view, _) = setup();
        let a = ctl.view_policy("7").await;
        let b = ctl.edit_policy("7").await;
        let c = ctl.request_export("excel").await;

        assert_ne!(a, b);
        assert_ne!(b, c);
        let messages: Vec<_> = view.banners().into_iter().map(|b| b.message).collect();
        assert_eq!(
            messages,
            vec![VIEW_COMING_SOON, EDIT_COMING_SOON, "EXCEL export is coming soon!"]
        );
        assert!(view.banners().iter().all(|b| b.severity == Severity::Info));
    }

    #[tokio::test]
    async fn banners_auto_dismiss_and_manual_dismiss() {
        let (ctl, _, view, clock) = setup();
        let first = ctl.notify("one", Severity::Info).await;
        clock.advance(Duration::from_secs(2));
        let second = ctl.notify("two", Severity::Error).await;

        ctl.dismiss_notification(second).await;
        assert_eq!(view.visible_banners().len(), 1);

        clock.advance(Duration::from_secs(3));
        ctl.tick().await;
        assert!(view.visible_banners().is_empty());

        // Already gone; nothing more is removed.
        ctl.dismiss_notification(first).await;
        assert_eq!(view.visible_banners().len(), 0);
    }
}
