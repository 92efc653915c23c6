use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ledger::Ledger;
use migration::MigratorTrait;
use narrative::{AnthropicClient, Narrator, NarratorConfig};
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, router};
use tower::ServiceExt;

async fn state() -> ServerState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();

    let config = NarratorConfig {
        timeout_secs: 1,
        ..NarratorConfig::default()
    };
    let client = AnthropicClient::new(&config, None).unwrap();
    let narrator = Narrator::new(Arc::new(client), &config);

    ServerState::new(
        Arc::new(ledger),
        Arc::new(narrator),
        chrono_tz::Africa::Johannesburg,
    )
}

async fn app() -> Router {
    router(state().await)
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_cash(app: &Router) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/accounts",
        Some(json!({
            "name": "Liquid Cash",
            "account_type": "personal",
            "category": "checking"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_always_ok() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn salary_moves_balance_net_worth_and_goal() {
    let app = app().await;
    let cash = create_cash(&app).await;

    let (status, _) = call(
        &app,
        "PUT",
        "/goals",
        Some(json!({
            "title": "Net Worth R500K",
            "life_category": "personal",
            "target_minor": 50_000_000,
            "metric": "net_worth",
            "priority": "high"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "account_id": cash,
            "amount_minor": 1_800_000,
            "description": "salary",
            "category": "income"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, accounts) = call(&app, "GET", "/accounts", None).await;
    assert_eq!(accounts[0]["balance_minor"], 1_800_000);

    let (_, net_worth) = call(&app, "GET", "/networth", None).await;
    assert_eq!(net_worth["net_worth_minor"], 1_800_000);

    let (status, goal) = call(&app, "GET", "/goals/Net%20Worth%20R500K", None).await;
    assert_eq!(status, StatusCode::OK);
    let progress = goal["progress_pct"].as_f64().unwrap();
    assert!((progress - 3.6).abs() < 1e-9);
}

#[tokio::test]
async fn errors_map_to_statuses() {
    let app = app().await;

    let (status, body) = call(&app, "GET", "/goals/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "\"goal 'ghost'\" not found!");

    let (status, _) = call(
        &app,
        "POST",
        "/accounts",
        Some(json!({"name": "Wallet", "account_type": "crypto", "category": "checking"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let cash = create_cash(&app).await;
    let (status, _) = call(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "account_id": cash,
            "amount_minor": 0,
            "description": "nothing",
            "category": "income"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "GET", "/briefing?kind=weekly", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_goal_progress_keeps_status() {
    let app = app().await;
    call(
        &app,
        "PUT",
        "/goals",
        Some(json!({
            "title": "Own a House",
            "life_category": "personal",
            "target_minor": 100_000
        })),
    )
    .await;

    let (status, goal) = call(
        &app,
        "POST",
        "/goals/own%20a%20house/progress",
        Some(json!({"current_minor": 150_000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(goal["progress_pct"].as_f64().unwrap() >= 100.0);
    assert_eq!(goal["status"], "active");

    let (_, goal) = call(
        &app,
        "POST",
        "/goals/Own%20a%20House/status",
        Some(json!({"status": "achieved"})),
    )
    .await;
    assert_eq!(goal["status"], "achieved");
}

#[tokio::test]
async fn revenue_counts_toward_today() {
    let app = app().await;
    let (status, _) = call(
        &app,
        "POST",
        "/accounts",
        Some(json!({
            "name": "43V3R Tech Business",
            "account_type": "tech_business",
            "category": "checking"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    call(
        &app,
        "PUT",
        "/goals",
        Some(json!({
            "title": "43V3R Daily Revenue",
            "life_category": "tech_business",
            "target_minor": 488_100,
            "metric": "daily_revenue"
        })),
    )
    .await;

    let (status, _) = call(
        &app,
        "POST",
        "/revenue",
        Some(json!({"amount_minor": 100_000, "client": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, today) = call(&app, "GET", "/revenue/today", None).await;
    assert_eq!(today["total_minor"], 100_000);
    assert_eq!(today["target_minor"], 488_100);

    let (_, business) = call(&app, "GET", "/analytics/business", None).await;
    assert_eq!(business["month_to_date_minor"], 100_000);
}

#[tokio::test]
async fn briefing_falls_back_without_generator() {
    let app = app().await;
    create_cash(&app).await;

    let (status, body) = call(&app, "GET", "/briefing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "daily");
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["fallback_reason"], "no API key configured");
    assert!(
        body["text"]
            .as_str()
            .unwrap()
            .starts_with("# LIF3 Daily Command Center - ")
    );
}

#[tokio::test]
async fn stored_daily_briefing_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let state = state().await.with_briefings_dir(dir.path());
    let path = server::briefing_path(dir.path(), state.today());
    std::fs::write(&path, "# Written this morning\n").unwrap();
    let app = router(state);

    let (status, body) = call(&app, "GET", "/briefing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "stored");
    assert_eq!(body["text"], "# Written this morning\n");

    let (_, body) = call(&app, "GET", "/briefing?refresh=true", None).await;
    assert_eq!(body["source"], "fallback");

    let (_, body) = call(&app, "GET", "/briefing?kind=business", None).await;
    assert_eq!(body["kind"], "business");
    assert_eq!(body["source"], "fallback");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app().await;

    let (status, body) = send_raw(&app, "POST", "/commands", "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_raw(&app, "POST", "/accounts", r#"{"name": "Wallet"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("account_type"));

    let (status, body) = call(&app, "GET", "/transactions?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn commands_are_validated_then_applied() {
    let app = app().await;
    let cash = create_cash(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/commands",
        Some(json!({
            "op": "apply_transaction",
            "account_id": cash,
            "amount_minor": 0,
            "description": "x",
            "category": "income"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "amount_minor must not be zero");

    let (status, body) = call(
        &app,
        "POST",
        "/commands",
        Some(json!({"op": "set_account_balance", "account_id": cash, "balance_minor": 2_500_000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["op"], "set_account_balance");
    assert!(body["id"].is_string());

    let (_, net_worth) = call(&app, "GET", "/networth", None).await;
    assert_eq!(net_worth["net_worth_minor"], 2_500_000);
}

#[tokio::test]
async fn reversal_restores_balance_once() {
    let app = app().await;
    let cash = create_cash(&app).await;
    let (_, created) = call(
        &app,
        "POST",
        "/transactions",
        Some(json!({
            "account_id": cash,
            "amount_minor": -50_000,
            "description": "groceries",
            "category": "expense"
        })),
    )
    .await;
    let tx = created["id"].as_str().unwrap();

    let uri = format!("/transactions/{tx}/reverse");
    let (status, _) = call(&app, "POST", &uri, Some(json!({"note": "refunded"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, accounts) = call(&app, "GET", "/accounts", None).await;
    assert_eq!(accounts[0]["balance_minor"], 0);

    let (_, txs) = call(&app, "GET", &format!("/transactions?account_id={cash}"), None).await;
    assert_eq!(txs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn net_worth_update_uses_primary_personal_account() {
    let app = app().await;
    create_cash(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/networth/update",
        Some(json!({"balance_minor": 23_962_500})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net_worth_minor"], 23_962_500);
    assert_eq!(body["currency"], "ZAR");
}

#[tokio::test]
async fn status_reports_counts() {
    let app = app().await;
    create_cash(&app).await;
    let (status, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
    assert_eq!(body["accounts"], 1);
    assert_eq!(body["generation_configured"], false);
}
