//! Dashboard routes driven through the router against the in-memory node.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use carbon_client::LedgerClient;
use carbon_dashboard::{router, DashboardState};
use carbon_nullables::NullLedger;
use carbon_types::Address;

const OPERATOR_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const OPERATOR: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

fn contract() -> Address {
    Address::new([0xCC; 20])
}

fn setup() -> (Router, Arc<DashboardState<NullLedger>>) {
    let client = LedgerClient::new(NullLedger::new(contract()), contract());
    let state = Arc::new(DashboardState::new(client));
    (router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, form: &str) -> (StatusCode, String) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

async fn sign_in(app: &Router) {
    let (status, _) = post(app, "/session", &format!("private_key={OPERATOR_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn home_shows_total_and_sign_in_form() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Total Credits Issued: 0"));
    assert!(body.contains("name=\"private_key\""));
}

#[tokio::test]
async fn sign_in_shows_operator_and_never_echoes_key() {
    let (app, _) = setup();
    let (status, body) = post(&app, "/session", &format!("private_key={OPERATOR_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("Connected as: <code>{OPERATOR}</code>")));
    assert!(!body.contains(&OPERATOR_KEY[2..]));
}

#[tokio::test]
async fn bad_key_is_rejected() {
    let (app, state) = setup();
    let (status, body) = post(&app, "/session", "private_key=0x1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid input"));
    assert!(state.lock().await.session.is_none());
}

#[tokio::test]
async fn sign_out_discards_session() {
    let (app, state) = setup();
    sign_in(&app).await;
    let (_, body) = post(&app, "/session/end", "").await;
    assert!(body.contains("name=\"private_key\""));
    assert!(state.lock().await.session.is_none());
}

#[tokio::test]
async fn write_without_session_asks_to_sign_in() {
    let (app, state) = setup();
    let (status, body) = post(&app, "/credits/retire", "id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("sign in first"));
    let desk = state.lock().await;
    assert!(desk.client.transport().methods().iter().all(|m| m != "eth_sendRawTransaction"));
}

#[tokio::test]
async fn issue_links_to_explorer_and_updates_total() {
    let (app, _) = setup();
    sign_in(&app).await;
    let form = format!("to={RECIPIENT}&amount=50&location=Amazon+Rainforest%2C+Brazil");
    let (status, body) = post(&app, "/credits/issue", &form).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Credit issued."));
    assert!(body.contains("https://sepolia.etherscan.io/tx/0x"));
    assert!(body.contains("Total Credits Issued: 1"));

    let (status, body) = get(&app, "/credits?id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(RECIPIENT));
    assert!(body.contains("50 tons CO₂"));
    assert!(body.contains("Amazon Rainforest, Brazil"));
}

#[tokio::test]
async fn reverted_transfer_reports_transaction_failure() {
    let (app, state) = setup();
    let owner = Address::new([0x0A; 20]);
    state
        .lock()
        .await
        .client
        .transport()
        .seed_credit(owner, 10, "Borneo")
        .unwrap();
    sign_in(&app).await;

    let (status, body) = post(
        &app,
        "/credits/transfer",
        &format!("id=1&to={RECIPIENT}&amount=10"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Transaction failed"));
    assert_eq!(state.lock().await.client.transport().credit(1).unwrap().owner, owner);
}

#[tokio::test]
async fn retire_and_relocate_own_credit() {
    let (app, state) = setup();
    let operator = Address::parse(OPERATOR).unwrap();
    state
        .lock()
        .await
        .client
        .transport()
        .seed_credit(operator, 5, "Chile")
        .unwrap();
    sign_in(&app).await;

    let (status, _) = post(&app, "/credits/location", "id=1&new_location=Patagonia").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post(&app, "/credits/retire", "id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Credit retired."));

    let credit = state.lock().await.client.transport().credit(1).unwrap();
    assert!(credit.retired);
    assert_eq!(credit.location, "Patagonia");
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/credits?id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid input"));
}

#[tokio::test]
async fn missing_credit_is_reported() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/credits?id=9").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("not found"));
}

#[tokio::test]
async fn unknown_action_is_not_found() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/actions/mint-everything").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Unknown action"));
}

#[tokio::test]
async fn action_pages_render_forms() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/actions/transfer").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("action=\"/credits/transfer\""));
    assert!(body.contains("Sign in with a private key"));
}

#[tokio::test]
async fn transaction_page_shows_receipt() {
    let (app, _) = setup();
    sign_in(&app).await;
    let form = format!("to={RECIPIENT}&amount=1&location=Kenya");
    let (_, body) = post(&app, "/credits/issue", &form).await;
    let marker = "Credit issued. <code>";
    let start = body.find(marker).unwrap() + marker.len();
    let hash = &body[start..start + 66];

    let (status, body) = get(&app, &format!("/transactions/{hash}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("confirmed"));
}

#[tokio::test]
async fn offline_node_still_renders_page() {
    let (app, state) = setup();
    state.lock().await.client.transport().set_offline(true);
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error fetching total credits"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}
