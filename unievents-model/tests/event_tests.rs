use chrono::{NaiveDate, NaiveTime};
use unievents_model::{
    Event, EventDraft, EventId, ModelError, Mutation, MutationAction, MutationStatus,
    category_by_value, categories,
};

fn sample_event(id: &str) -> Event {
    Event {
        id: EventId::from(id),
        title: "Student Club Fair".into(),
        description: "<p>Explore the clubs.</p>".into(),
        date: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        start_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        location: "University Quad".into(),
        organizer: "Student Activities Board".into(),
        organizer_department: "Student Affairs".into(),
        categories: vec!["Student Life".into(), "Social".into()],
        image: None,
        featured: false,
        published: true,
        has_map: true,
    }
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn serializes_with_camel_case_and_short_times() {
    let json = serde_json::to_value(sample_event("2")).unwrap();
    assert_eq!(json["id"], "2");
    assert_eq!(json["startTime"], "11:00");
    assert_eq!(json["endTime"], "15:00");
    assert_eq!(json["organizerDepartment"], "Student Affairs");
    assert_eq!(json["hasMap"], true);
    assert_eq!(json["date"], "2025-05-20");
    assert!(json.get("image").is_none());
}

#[test]
fn deserializes_seconds_in_times() {
    let json = serde_json::json!({
        "id": "9",
        "title": "Late Lab",
        "date": "2025-09-01",
        "startTime": "18:30:00",
        "endTime": "20:00",
        "categories": ["Research"],
        "published": true
    });
    let event: Event = serde_json::from_value(json).unwrap();
    assert_eq!(event.start_time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    assert!(event.description.is_empty());
    assert!(!event.has_map);
}

#[test]
fn rejects_malformed_time() {
    let json = serde_json::json!({
        "id": "9", "title": "x", "date": "2025-09-01",
        "startTime": "noon", "endTime": "13:00"
    });
    assert!(serde_json::from_value::<Event>(json).is_err());
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn valid_event_passes() {
    assert!(sample_event("1").validate().is_ok());
}

#[test]
fn published_event_needs_a_category() {
    let mut event = sample_event("1");
    event.categories.clear();
    assert!(matches!(event.validate(), Err(ModelError::MissingCategory(_))));
}

#[test]
fn draft_event_may_have_no_category() {
    let mut event = sample_event("1");
    event.categories.clear();
    event.published = false;
    assert!(event.validate().is_ok());
}

#[test]
fn blank_title_is_rejected() {
    let mut event = sample_event("1");
    event.title = "   ".into();
    assert!(matches!(event.validate(), Err(ModelError::EmptyTitle)));
}

#[test]
fn end_before_start_is_rejected() {
    let mut event = sample_event("1");
    event.end_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let err = event.validate().unwrap_err();
    assert_eq!(err.to_string(), "event 1 ends (09:00) before it starts (11:00)");
}

// ── Drafts & duplicates ──────────────────────────────────────────

#[test]
fn draft_into_event_keeps_fields() {
    let event = sample_event("ignored");
    let draft: EventDraft = serde_json::from_value(serde_json::to_value(&event).unwrap()).unwrap();
    let built = draft.into_event(EventId::from("new-id"));
    assert_eq!(built.id.as_str(), "new-id");
    assert_eq!(built.title, event.title);
    assert_eq!(built.categories, event.categories);
}

#[test]
fn duplicate_is_an_unpublished_copy() {
    let copy = sample_event("2").duplicate(EventId::from("3"));
    assert_eq!(copy.id.as_str(), "3");
    assert_eq!(copy.title, "Student Club Fair (Copy)");
    assert!(!copy.published);
    assert_eq!(copy.location, "University Quad");
}

#[test]
fn generated_ids_are_unique() {
    assert_ne!(EventId::generate(), EventId::generate());
}

// ── Mutations ────────────────────────────────────────────────────

#[test]
fn delete_mutation_stores_id_stub() {
    let mutation = Mutation::Delete { id: EventId::from("x") };
    assert_eq!(mutation.data_json().unwrap(), r#"{"id":"x"}"#);
    let back = Mutation::from_parts(MutationAction::Delete, r#"{"id":"x"}"#).unwrap();
    assert_eq!(back, mutation);
}

#[test]
fn update_mutation_rebuilds_from_parts() {
    let mutation = Mutation::Update(sample_event("7"));
    let json = mutation.data_json().unwrap();
    let back = Mutation::from_parts(MutationAction::Update, &json).unwrap();
    assert_eq!(back.action(), MutationAction::Update);
    assert_eq!(back.target_id().as_str(), "7");
}

#[test]
fn retarget_rewrites_the_target_id() {
    let mut mutation = Mutation::Create(sample_event("local"));
    mutation.retarget(EventId::from("server"));
    assert_eq!(mutation.target_id().as_str(), "server");
}

#[test]
fn action_parsing() {
    assert_eq!("create".parse::<MutationAction>().unwrap(), MutationAction::Create);
    assert_eq!(MutationAction::Delete.to_string(), "delete");
    assert!(matches!(
        "upsert".parse::<MutationAction>(),
        Err(ModelError::UnknownAction(_))
    ));
}

#[test]
fn unknown_status_reads_as_pending() {
    assert_eq!(MutationStatus::parse_lossy("parked"), MutationStatus::Parked);
    assert_eq!(MutationStatus::parse_lossy("???"), MutationStatus::Pending);
}

// ── Categories ───────────────────────────────────────────────────

#[test]
fn category_catalogue_lookup() {
    assert_eq!(categories().len(), 14);
    assert_eq!(category_by_value("student-life").unwrap().label, "Student Life");
    assert!(category_by_value("quidditch").is_none());
}
