use pretty_assertions::assert_eq;
use unievents_model::{AdminQuery, EventId, EventQuery, SortOrder, StatusFilter};
use unievents_remote::seed::seed_events;
use unievents_remote::{EventService, HttpEventService, RemoteConfig, RemoteError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> HttpEventService {
    let config = RemoteConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        simulated_latency_ms: 0,
    };
    HttpEventService::new(config).unwrap()
}

fn page_json() -> serde_json::Value {
    serde_json::json!({
        "events": seed_events(),
        "totalPages": 1,
        "totalEvents": 6
    })
}

fn event_json(id: &str) -> serde_json::Value {
    let mut event = seed_events().remove(0);
    event.id = EventId::from(id);
    serde_json::to_value(event).unwrap()
}

// --- Listing ---

#[tokio::test]
async fn list_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(query_param("page", "2"))
        .and(query_param("category", "Student Life"))
        .and(query_param("sort", "title-desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let query = EventQuery {
        page: 2,
        category: Some("Student Life".into()),
        search: None,
        sort: SortOrder::TitleDesc,
    };
    let page = client.list(&query).await.unwrap();
    assert_eq!(page.total_events, 6);
    assert_eq!(page.events.len(), 6);
}

#[tokio::test]
async fn list_admin_sends_status_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/events"))
        .and(query_param("status", "draft"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "events": [],
            "totalPages": 0,
            "totalEvents": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let query = AdminQuery {
        status: StatusFilter::Draft,
        ..AdminQuery::default()
    };
    let page = client.list_admin(&query).await.unwrap();
    assert!(page.events.is_empty());
}

#[tokio::test]
async fn get_existing_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("42")))
        .mount(&server)
        .await;

    let event = setup(&server).get(&EventId::from("42")).await.unwrap();
    assert_eq!(event.map(|e| e.id), Some(EventId::from("42")));
}

#[tokio::test]
async fn get_missing_event_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(setup(&server).get(&EventId::from("404")).await.unwrap().is_none());
}

// --- Writes ---

#[tokio::test]
async fn create_posts_event_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(body_partial_json(serde_json::json!({
            "id": "local-1",
            "title": "Annual University Symposium",
            "startTime": "09:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json("srv-9")))
        .expect(1)
        .mount(&server)
        .await;

    let mut event = seed_events().remove(0);
    event.id = EventId::from("local-1");
    let created = setup(&server).create(event).await.unwrap();
    assert_eq!(created.id.as_str(), "srv-9");
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/events/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let event = seed_events().remove(0);
    let err = setup(&server)
        .update(&EventId::from("7"), event)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.is_terminal());
}

#[tokio::test]
async fn delete_with_empty_body_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let ack = setup(&server).delete(&EventId::from("3")).await.unwrap();
    assert!(ack.success);
    assert_eq!(ack.id, Some(EventId::from("3")));
}

#[tokio::test]
async fn delete_with_json_ack() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "id": "3" })),
        )
        .mount(&server)
        .await;

    let ack = setup(&server).delete(&EventId::from("3")).await.unwrap();
    assert!(ack.success);
}

#[tokio::test]
async fn declined_delete_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })))
        .mount(&server)
        .await;

    let err = setup(&server).delete(&EventId::from("3")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
    assert!(err.is_terminal());
}

#[tokio::test]
async fn duplicate_posts_to_duplicate_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/1/duplicate"))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json("1-copy")))
        .expect(1)
        .mount(&server)
        .await;

    let copy = setup(&server).duplicate(&EventId::from("1")).await.unwrap();
    assert_eq!(copy.id.as_str(), "1-copy");
}

// --- Error mapping ---

#[tokio::test]
async fn validation_failure_is_rejected_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({ "error": "title is required" })),
        )
        .mount(&server)
        .await;

    let err = setup(&server)
        .create(seed_events().remove(0))
        .await
        .unwrap_err();
    match err {
        RemoteError::Rejected(msg) => assert_eq!(msg, "title is required"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let err = setup(&server)
        .list(&EventQuery::first_page())
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        RemoteError::Server { status: 500, message } if message == "database down"
    ));
    assert!(!err.is_terminal());
}

#[tokio::test]
async fn malformed_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = setup(&server)
        .list(&EventQuery::first_page())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Serialization(_)));
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let config = RemoteConfig {
        base_url: "http://127.0.0.1:1".into(),
        timeout_secs: 2,
        simulated_latency_ms: 0,
    };
    let client = HttpEventService::new(config).unwrap();
    let err = client.list(&EventQuery::first_page()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Unreachable(_)));
    assert!(!err.is_terminal());
}

#[test]
fn invalid_config_is_refused() {
    let config = RemoteConfig {
        base_url: String::new(),
        ..RemoteConfig::default()
    };
    assert!(matches!(
        HttpEventService::new(config),
        Err(RemoteError::Config(_))
    ));
}
