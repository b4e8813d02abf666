use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;
use unievents_model::{AdminQuery, Event, EventId, EventQuery, StatusFilter};
use unievents_remote::{EventService, InMemoryEventService, RemoteCall, RemoteConfig, RemoteError};

fn new_event(id: &str) -> Event {
    Event {
        id: EventId::from(id),
        title: "Demo".into(),
        description: String::new(),
        date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        location: "Room 1".into(),
        organizer: "Dept".into(),
        organizer_department: "Faculty".into(),
        categories: vec!["Workshop".into()],
        image: None,
        featured: false,
        published: true,
        has_map: false,
    }
}

// ── Listing ──────────────────────────────────────────────────────

#[tokio::test]
async fn seeded_listing_returns_six_events_soonest_first() {
    let service = InMemoryEventService::seeded();
    let page = service.list(&EventQuery::first_page()).await.unwrap();
    assert_eq!(page.total_events, 6);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.events[0].title, "International Cultural Festival");
}

#[tokio::test]
async fn listing_hides_drafts_but_admin_sees_them() {
    let service = InMemoryEventService::seeded();
    let mut draft = new_event("draft");
    draft.published = false;
    service.create(draft).await.unwrap();

    assert_eq!(service.list(&EventQuery::first_page()).await.unwrap().total_events, 6);
    let admin = AdminQuery { status: StatusFilter::Draft, ..AdminQuery::default() };
    let drafts = service.list_admin(&admin).await.unwrap();
    assert_eq!(drafts.total_events, 1);
    assert_eq!(drafts.events[0].id.as_str(), "draft");
}

#[tokio::test]
async fn get_returns_none_for_missing() {
    let service = InMemoryEventService::seeded();
    assert!(service.get(&EventId::from("1")).await.unwrap().is_some());
    assert!(service.get(&EventId::from("99")).await.unwrap().is_none());
}

// ── Writes ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_keeps_client_id() {
    let service = InMemoryEventService::new();
    let created = service.create(new_event("client-1")).await.unwrap();
    assert_eq!(created.id.as_str(), "client-1");
    assert_eq!(service.all_events().await.len(), 1);
}

#[tokio::test]
async fn create_without_id_mints_one() {
    let service = InMemoryEventService::new();
    let created = service.create(new_event("")).await.unwrap();
    assert!(!created.id.is_empty());
}

#[tokio::test]
async fn server_assigned_ids_ignore_client_id() {
    let service = InMemoryEventService::new().with_server_assigned_ids();
    let created = service.create(new_event("client-1")).await.unwrap();
    assert_ne!(created.id.as_str(), "client-1");
}

#[tokio::test]
async fn replayed_create_does_not_duplicate() {
    let service = InMemoryEventService::new();
    service.create(new_event("a")).await.unwrap();
    service.create(new_event("a")).await.unwrap();
    assert_eq!(service.all_events().await.len(), 1);
}

#[tokio::test]
async fn create_rejects_invalid_event() {
    let service = InMemoryEventService::new();
    let mut event = new_event("a");
    event.categories.clear();
    let err = service.create(event).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
    assert!(err.is_terminal());
}

#[tokio::test]
async fn update_replaces_record() {
    let service = InMemoryEventService::seeded();
    let mut event = service.get(&EventId::from("2")).await.unwrap().unwrap();
    event.title = "Club Fair (moved)".into();
    let updated = service.update(&EventId::from("2"), event).await.unwrap();
    assert_eq!(updated.title, "Club Fair (moved)");
    assert_eq!(
        service.get(&EventId::from("2")).await.unwrap().unwrap().title,
        "Club Fair (moved)"
    );
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let service = InMemoryEventService::new();
    let err = service.update(&EventId::from("x"), new_event("x")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.is_terminal());
}

#[tokio::test]
async fn delete_then_delete_again_is_not_found() {
    let service = InMemoryEventService::seeded();
    let ack = service.delete(&EventId::from("3")).await.unwrap();
    assert!(ack.success);
    let err = service.delete(&EventId::from("3")).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(id) if id == "3"));
}

#[tokio::test]
async fn duplicate_creates_unpublished_copy() {
    let service = InMemoryEventService::seeded();
    let copy = service.duplicate(&EventId::from("1")).await.unwrap();
    assert_eq!(copy.title, "Annual University Symposium (Copy)");
    assert!(!copy.published);
    assert_ne!(copy.id.as_str(), "1");
    assert_eq!(service.all_events().await.len(), 7);
}

// ── Failure simulation ───────────────────────────────────────────

#[tokio::test]
async fn unreachable_service_fails_transiently() {
    let service = InMemoryEventService::seeded();
    service.set_reachable(false);
    let err = service.list(&EventQuery::first_page()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Unreachable(_)));
    assert!(!err.is_terminal());

    service.set_reachable(true);
    assert!(service.list(&EventQuery::first_page()).await.is_ok());
}

#[tokio::test]
async fn failing_ids_only_affect_their_writes() {
    let service = InMemoryEventService::seeded();
    service.fail_writes_for("2");
    assert!(service.delete(&EventId::from("2")).await.is_err());
    assert!(service.delete(&EventId::from("4")).await.is_ok());

    service.clear_failures();
    assert!(service.delete(&EventId::from("2")).await.is_ok());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let service = InMemoryEventService::seeded();
    service.list(&EventQuery::first_page()).await.unwrap();
    service.delete(&EventId::from("1")).await.unwrap();
    let _ = service.delete(&EventId::from("1")).await;

    assert_eq!(
        service.write_calls(),
        vec![
            RemoteCall::Delete(EventId::from("1")),
            RemoteCall::Delete(EventId::from("1")),
        ]
    );
    assert_eq!(service.calls().len(), 3);
    service.clear_calls();
    assert!(service.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn simulated_latency_delays_calls() {
    let config = RemoteConfig {
        simulated_latency_ms: 500,
        ..RemoteConfig::default()
    };
    let service = InMemoryEventService::seeded().with_config(&config);
    let started = tokio::time::Instant::now();
    service.get(&EventId::from("1")).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(500));
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn config_validation() {
    assert!(RemoteConfig::default().validate().is_ok());
    let empty = RemoteConfig { base_url: " ".into(), ..RemoteConfig::default() };
    assert!(matches!(empty.validate(), Err(RemoteError::Config(_))));
    let zero = RemoteConfig { timeout_secs: 0, ..RemoteConfig::default() };
    assert!(zero.validate().is_err());
}

#[test]
fn config_fills_missing_fields_with_defaults() {
    let config: RemoteConfig =
        serde_json::from_str(r#"{"base_url": "https://events.example.edu"}"#).unwrap();
    assert_eq!(config.base_url, "https://events.example.edu");
    assert_eq!(config.timeout_secs, 30);
}
