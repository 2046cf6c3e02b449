//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use billbook_core::ai::MockBackend;
use billbook_core::test_utils::MockLlmServer;
use billbook_core::{AIClient, BillInput, MonthKey};
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_with_assistant(assistant: BillsAssistant) -> (TempDir, BillStore, Router) {
    let temp_dir = TempDir::new().unwrap();
    let store = BillStore::open(temp_dir.path().join("bills.json")).unwrap();
    let config = ServerConfig {
        allowed_origins: vec![],
    };
    let app = create_router_with_options(store.clone(), None, config, assistant);
    (temp_dir, store, app)
}

fn setup_test_app() -> (TempDir, BillStore, Router) {
    setup_with_assistant(BillsAssistant::new(Some(AIClient::mock())))
}

fn seed_bill(store: &BillStore, id: &str, name: &str, due_day: f64, amount: f64) {
    let bill = BillInput {
        name: Some(name.to_string()),
        due_day: Some(due_day),
        amount: Some(amount),
        ..Default::default()
    }
    .into_bill(id.to_string())
    .unwrap();
    store.upsert_bill(bill).unwrap();
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Health / Routing Tests ==========

#[tokio::test]
async fn test_health() {
    let (_dir, _store, app) = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let json = get_body_json(response).await;
    assert_eq!(json, json!({ "status": "ok", "chat": true }));
}

#[tokio::test]
async fn test_health_without_chat_backend() {
    let (_dir, _store, app) = setup_with_assistant(BillsAssistant::new(None));

    let json = get_body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(json["chat"], false);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (_dir, _store, app) = setup_test_app();

    for uri in ["/api/nope", "/nothing-here"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let json = get_body_json(response).await;
        assert_eq!(json, json!({ "error": "Not found" }));
    }
}

#[tokio::test]
async fn test_static_dir_is_served() {
    let static_dir = TempDir::new().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>Bills</h1>").unwrap();

    let data_dir = TempDir::new().unwrap();
    let store = BillStore::open(data_dir.path().join("bills.json")).unwrap();
    let app = create_router_with_options(
        store,
        static_dir.path().to_str(),
        ServerConfig::default(),
        BillsAssistant::default(),
    );

    let response = app.clone().oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>Bills</h1>");

    // API routes still win over static files
    let response = app.oneshot(get("/api/bills")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let temp_dir = TempDir::new().unwrap();
    let store = BillStore::open(temp_dir.path().join("bills.json")).unwrap();
    let config = ServerConfig {
        allowed_origins: parse_allowed_origins("http://localhost:5173/, "),
    };
    let app = create_router_with_options(store, None, config, BillsAssistant::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5173"
    );
}

#[test]
fn test_parse_allowed_origins() {
    assert_eq!(
        parse_allowed_origins(" http://a.test/ ,http://b.test,,"),
        vec!["http://a.test".to_string(), "http://b.test".to_string()]
    );
    assert!(parse_allowed_origins("").is_empty());
}

// ========== Bill API Tests ==========

#[tokio::test]
async fn test_create_bill_applies_defaults() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bills",
            json!({ "name": "  Internet ", "dueDay": 14.6, "amount": 59.99 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    let id = json["id"].as_str().unwrap();
    assert_eq!(id.len(), billbook_core::validate::GENERATED_ID_LEN);
    assert_eq!(json["name"], "Internet");
    assert_eq!(json["dueDay"], 15);
    assert_eq!(json["amount"], 59.99);
    assert_eq!(json["notes"], "");
    assert_eq!(json["isRecurring"], true);

    let stored = store.get_bill(id).unwrap().unwrap();
    assert_eq!(stored.name, "Internet");
}

#[tokio::test]
async fn test_create_bill_keeps_supplied_id() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bills",
            json!({ "id": "rent", "name": "Rent", "dueDay": 1, "amount": 1200, "isRecurring": false }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bill = store.get_bill("rent").unwrap().unwrap();
    assert!(!bill.is_recurring);
}

#[tokio::test]
async fn test_create_bill_validation_errors() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bills",
            json!({ "name": " ", "dueDay": 0, "amount": -5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({ "errors": [
            "'name' is required",
            "'dueDay' must be a number between 1 and 31",
            "'amount' must be a non-negative number"
        ] })
    );
    assert!(store.list_bills().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_bill_invalid_json() {
    let (_dir, _store, app) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bills")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn test_create_bill_wrong_field_types() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bills",
            json!({ "name": "Phone", "dueDay": "15", "amount": 45, "notes": 7 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({ "errors": [
            "'dueDay' must be a number between 1 and 31",
            "'notes' must be a string if provided"
        ] })
    );
    assert!(store.list_bills().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_bill_empty_body() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bills")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json,
        json!({ "errors": [
            "'name' is required",
            "'dueDay' must be a number between 1 and 31",
            "'amount' must be a non-negative number"
        ] })
    );

    let response = app
        .oneshot(json_request("POST", "/api/bills", json!([1, 2])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await,
        json!({ "errors": ["request body must be a JSON object"] })
    );
    assert!(store.list_bills().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_bills_plain_and_decorated() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "net", "Internet", 31.0, 60.0);
    store
        .set_paid_status(&"2024-02".parse().unwrap(), "net", true)
        .unwrap();

    let json = get_body_json(app.clone().oneshot(get("/api/bills")).await.unwrap()).await;
    let bills = json.as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert!(bills[0].get("isPaid").is_none());

    let json = get_body_json(
        app.oneshot(get("/api/bills?month=2024-02"))
            .await
            .unwrap(),
    )
    .await;
    let bill = &json.as_array().unwrap()[0];
    assert_eq!(bill["id"], "net");
    assert_eq!(bill["isPaid"], true);
    assert_eq!(bill["dueDate"], "2024-02-29");
    assert_eq!(bill["dueDateLabel"], "02/29/2024");
}

#[tokio::test]
async fn test_list_bills_bad_month() {
    let (_dir, _store, app) = setup_test_app();

    for uri in ["/api/bills?month=2024-13", "/api/bills?month=abc"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let json = get_body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("YYYY-MM"));
    }
}

#[tokio::test]
async fn test_get_bill() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "water", "Water", 5.0, 30.0);

    let response = app.clone().oneshot(get("/api/bills/water")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["name"], "Water");

    let response = app.oneshot(get("/api/bills/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_bill_merges_fields() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "power", "Power", 20.0, 80.0);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/bills/power",
            json!({ "amount": 95.5, "notes": "winter rate", "id": "ignored" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["id"], "power");
    assert_eq!(json["name"], "Power");
    assert_eq!(json["dueDay"], 20);
    assert_eq!(json["amount"], 95.5);
    assert_eq!(json["notes"], "winter rate");

    let bills = store.list_bills().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].amount, 95.5);
}

#[tokio::test]
async fn test_update_bill_validates_merged_result() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "power", "Power", 20.0, 80.0);
    let before = store.get_bill("power").unwrap().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/bills/power",
            json!({ "dueDay": 32, "name": "Renamed", "amount": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["errors"],
        json!(["'dueDay' must be a number between 1 and 31"])
    );
    assert_eq!(store.get_bill("power").unwrap().unwrap(), before);

    // A mistyped field fails instead of falling back to the stored value
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/bills/power",
            json!({ "amount": "free", "notes": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["errors"],
        json!(["'amount' must be a non-negative number"])
    );
    assert_eq!(store.get_bill("power").unwrap().unwrap(), before);
}

#[tokio::test]
async fn test_update_unknown_bill() {
    let (_dir, store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/bills/ghost",
            json!({ "name": "Ghost", "dueDay": 1, "amount": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(store.list_bills().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_bill() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "gym", "Gym", 3.0, 25.0);
    let month: MonthKey = "2024-05".parse().unwrap();
    store.set_paid_status(&month, "gym", true).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/bills/gym")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.list_bills().unwrap().is_empty());
    assert!(store.document().unwrap().paid_status.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/bills/gym")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Paid Status Tests ==========

#[tokio::test]
async fn test_set_paid_status_toggle() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "rent", "Rent", 1.0, 1000.0);
    let month: MonthKey = "2024-02".parse().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bills/rent/paid",
            json!({ "month": "2024-02", "isPaid": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await,
        json!({ "id": "rent", "month": "2024-02", "isPaid": true })
    );
    assert!(store.document().unwrap().is_paid(&month, "rent"));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bills/rent/paid",
            json!({ "month": "2024-02", "isPaid": false }),
        ))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["isPaid"], false);
    assert!(store.document().unwrap().paid_status.is_empty());

    // Non-boolean flags follow truthiness
    for (flag, expected) in [(json!(1), true), (json!(0), false), (json!("yes"), true)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/bills/rent/paid",
                json!({ "month": "2024-02", "isPaid": flag }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_body_json(response).await["isPaid"], expected);
        assert_eq!(store.document().unwrap().is_paid(&month, "rent"), expected);
    }
}

#[tokio::test]
async fn test_set_paid_status_errors() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "rent", "Rent", 1.0, 1000.0);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bills/rent/paid",
            json!({ "isPaid": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await,
        json!({ "error": "'month' is required" })
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bills/rent/paid",
            json!({ "month": 202402, "isPaid": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await,
        json!({ "error": "'month' is required" })
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bills/rent/paid",
            json!({ "month": "2024-2", "isPaid": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bills/ghost/paid",
            json!({ "month": "2024-02", "isPaid": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json, json!({ "error": "Bill not found: ghost" }));
    assert!(store.document().unwrap().paid_status.is_empty());
}

// ========== Summary Tests ==========

#[tokio::test]
async fn test_monthly_summary() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "rent", "Rent", 1.0, 100.0);
    let repair = BillInput {
        name: Some("Repair".to_string()),
        due_day: Some(31.0),
        amount: Some(50.0),
        is_recurring: Some(false),
        ..Default::default()
    }
    .into_bill("repair".to_string())
    .unwrap();
    store.upsert_bill(repair).unwrap();
    store
        .set_paid_status(&"2024-02".parse().unwrap(), "rent", true)
        .unwrap();

    let response = app
        .oneshot(get("/api/summary?month=2024-02"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["month"], "2024-02");
    assert_eq!(json["bills"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["totals"],
        json!({
            "totalDue": 150.0,
            "recurringDue": 100.0,
            "oneTimeDue": 50.0,
            "paid": 100.0,
            "paidRecurring": 100.0,
            "remaining": 50.0,
            "remainingRecurring": 0.0
        })
    );
}

#[tokio::test]
async fn test_summary_defaults_to_current_month() {
    let (_dir, _store, app) = setup_test_app();

    let json = get_body_json(app.oneshot(get("/api/summary")).await.unwrap()).await;
    assert_eq!(json["month"], MonthKey::current().to_string());
    assert_eq!(json["totals"]["totalDue"], 0.0);
}

// ========== Chat Tests ==========

#[tokio::test]
async fn test_chat_with_mock_backend() {
    let (_dir, store, app) = setup_test_app();
    seed_bill(&store, "rent", "Rent", 1.0, 100.0);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            json!({ "message": "What is due?", "month": "2024-02" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await,
        json!({ "reply": "Mock answer: What is due?" })
    );
}

#[tokio::test]
async fn test_chat_through_openai_compatible_server() {
    let server = MockLlmServer::start().await;
    let client = AIClient::openai_compatible(&server.url(), "gpt-4o-mini", Some("sk-test"));
    let (_dir, _store, app) = setup_with_assistant(BillsAssistant::new(Some(client)));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            json!({ "message": "How much is left?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await["reply"],
        "Mock answer: How much is left?"
    );
}

#[tokio::test]
async fn test_chat_requires_message() {
    let (_dir, _store, app) = setup_test_app();

    for body in [json!({}), json!({ "message": "   " }), json!({ "message": 12 })] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chat", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_body_json(response).await,
            json!({ "error": "'message' is required" })
        );
    }
}

#[tokio::test]
async fn test_chat_bad_month() {
    let (_dir, _store, app) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            json!({ "message": "hi", "month": "June" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_unconfigured_is_unavailable() {
    let (_dir, _store, app) = setup_with_assistant(BillsAssistant::new(None));

    let response = app
        .oneshot(json_request("POST", "/api/chat", json!({ "message": "hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], billbook_core::assistant::NOT_CONFIGURED);
}

#[tokio::test]
async fn test_chat_provider_failure_is_unavailable() {
    let assistant = BillsAssistant::new(Some(AIClient::Mock(MockBackend::failing(
        "OpenAI API error 429: rate limited",
    ))));
    let (_dir, _store, app) = setup_with_assistant(assistant);

    let response = app
        .oneshot(json_request("POST", "/api/chat", json!({ "message": "hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        get_body_json(response).await,
        json!({ "error": "OpenAI API error 429: rate limited" })
    );
}

// ========== Error Mapping Tests ==========

#[test]
fn test_app_error_mapping() {
    let err: AppError = billbook_core::Error::NotFound("Bill not found".into()).into();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err: AppError = billbook_core::Error::Validation(vec!["x".into()]).into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err: AppError = billbook_core::Error::AiUnavailable("down".into()).into();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    let err: AppError = billbook_core::Error::Io(io).into();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.message, "An internal error occurred");
}

#[tokio::test]
async fn test_corrupt_store_is_sanitized_500() {
    let (_dir, store, app) = setup_test_app();
    std::fs::write(store.path(), "{ definitely not json").unwrap();

    let response = app.oneshot(get("/api/bills")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        get_body_json(response).await,
        json!({ "error": "An internal error occurred" })
    );
}
