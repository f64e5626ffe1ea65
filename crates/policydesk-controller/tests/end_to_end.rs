//! Whole-page scenarios against the fake backend and a recording view.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use policydesk_client::ClientError;
use policydesk_controller::testing::{FakeBackend, RecordingView};
use policydesk_controller::{
    ControllerSettings, FragmentView, LoadOutcome, ManualClock, ViewController, ViewPhase,
};
use policydesk_core::{CreateResponse, NewPolicy, PolicyRecord, PolicyStatus, RecordId};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap()
}

fn policy(id: i64, number: &str, end: DateTime<Utc>) -> PolicyRecord {
    PolicyRecord {
        id: Some(RecordId::Int(id)),
        policy_number: Some(number.to_string()),
        customer_name: Some("Ayşe Demir".to_string()),
        product: Some("Trafik".to_string()),
        gross_premium: Some(1250.5),
        end_date: Some(end.to_rfc3339()),
        ..Default::default()
    }
}

fn three_policies() -> Vec<PolicyRecord> {
    vec![
        policy(1, "TRF-001", now() - TimeDelta::days(1)),
        policy(2, "TRF-002", now() + TimeDelta::days(5)),
        policy(3, "TRF-003", now() + TimeDelta::days(60)),
    ]
}

fn recording() -> (
    ViewController<Arc<FakeBackend>, RecordingView, ManualClock>,
    Arc<FakeBackend>,
    RecordingView,
    ManualClock,
) {
    let backend = Arc::new(FakeBackend::new());
    let view = RecordingView::new();
    let clock = ManualClock::new(now());
    let ctl = ViewController::new(
        backend.clone(),
        view.clone(),
        clock.clone(),
        ControllerSettings::default(),
    );
    (ctl, backend, view, clock)
}

#[tokio::test]
async fn expiring_filter_selects_only_the_middle_policy() {
    let (ctl, backend, view, _) = recording();
    backend.set_policies(three_policies());
    ctl.load_initial().await;

    ctl.set_status_filter(Some(PolicyStatus::Expiring)).await;
    assert_eq!(view.last_policy_numbers(), vec!["TRF-002"]);

    ctl.set_status_filter(Some(PolicyStatus::Expired)).await;
    assert_eq!(view.last_policy_numbers(), vec!["TRF-001"]);

    ctl.set_status_filter(Some(PolicyStatus::Active)).await;
    assert_eq!(view.last_policy_numbers(), vec!["TRF-003"]);
}

#[tokio::test]
async fn burst_of_searches_filters_once() {
    let (ctl, backend, view, clock) = recording();
    backend.set_policies(three_policies());
    ctl.load_policies().await;
    let before = view.table_renders();

    for term in ["T", "TR", "TRF", "TRF-", "TRF-00", "TRF-003"] {
        ctl.on_search_input(term).await;
        clock.advance(Duration::from_millis(40));
        ctl.tick().await;
    }
    assert_eq!(view.table_renders(), before);

    clock.advance(Duration::from_millis(300));
    ctl.tick().await;
    ctl.tick().await;

    assert_eq!(view.table_renders(), before + 1);
    assert_eq!(view.last_policy_numbers(), vec!["TRF-003"]);
}

#[tokio::test]
async fn failed_create_changes_nothing_but_the_banners() {
    let (ctl, backend, view, _) = recording();
    backend.set_policies(three_policies());
    ctl.load_policies().await;
    let snapshot = ctl.policies().await;
    let renders = view.table_renders();

    backend.push_create(Ok(CreateResponse {
        success: false,
        error: Some("Bu poliçe numarası zaten kayıtlı".to_string()),
        message: None,
    }));
    backend.push_create(Err(ClientError::Request("connection reset".to_string())));

    let payload = NewPolicy {
        policy_number: Some("TRF-001".to_string()),
        ..Default::default()
    };
    assert!(!ctl.submit_policy(&payload).await);
    assert!(!ctl.submit_policy(&payload).await);

    assert_eq!(ctl.policies().await, snapshot);
    assert_eq!(view.table_renders(), renders);
    assert_eq!(backend.policy_fetches(), 1);
    assert_eq!(view.visible_banners().len(), 2);
}

#[tokio::test]
async fn filter_then_clear_restores_snapshot_order() {
    let (ctl, backend, view, _) = recording();
    backend.set_policies(three_policies());
    ctl.load_policies().await;

    ctl.search("002").await;
    ctl.set_product_filter(Some("Trafik")).await;
    assert_eq!(ctl.phase().await, ViewPhase::Filtered);
    assert_eq!(view.last_policy_numbers(), vec!["TRF-002"]);

    ctl.clear_filters().await;
    assert_eq!(ctl.visible_policies().await, three_policies());
    assert_eq!(view.last_policy_numbers(), vec!["TRF-001", "TRF-002", "TRF-003"]);
}

#[tokio::test]
async fn load_failures_surface_one_banner_each() {
    let (ctl, backend, view, _) = recording();
    backend.push_policies(Err(ClientError::Connect("refused".to_string())));
    backend.push_salespeople(Err(ClientError::Decode("missing salespeople".to_string())));

    let outcomes = ctl.load_initial().await;
    assert_eq!(outcomes, (LoadOutcome::Failed, LoadOutcome::Failed));
    assert_eq!(view.banners().len(), 2);
    assert_eq!(view.table_renders(), 0);
    assert_eq!(ctl.phase().await, ViewPhase::NoData);
}

#[tokio::test]
async fn fragment_view_holds_rendered_html() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_policies(three_policies());
    let ctl = ViewController::new(
        backend,
        FragmentView::new(),
        ManualClock::new(now()),
        ControllerSettings::default(),
    );
    ctl.load_initial().await;

    let view = ctl.view().await;
    let body = view.table_body.as_deref().unwrap();
    assert!(body.contains("TRF-002"));
    assert!(body.contains("₺1.250,5"));
    assert!(body.contains("15.03.2025"));
    assert!(view.salesperson_select.as_deref().unwrap().contains("Select"));
}
