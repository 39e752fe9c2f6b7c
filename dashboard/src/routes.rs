//! Request handlers. Each one holds the state lock until its page is rendered.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use carbon_client::{ClientError, OperatorSession, RpcTransport};
use carbon_types::TxHash;

use crate::forms::{
    parse_address, parse_amount, parse_id, Action, IssueForm, LocationForm, RetireForm,
    SessionForm, TransferForm, ViewQuery,
};
use crate::html::{self, Header, Notice, Tone};
use crate::state::{DashboardState, Desk};

type Shared<T> = Arc<DashboardState<T>>;

/// Build the dashboard router.
pub fn router<T: RpcTransport + 'static>(state: Shared<T>) -> Router {
    Router::new()
        .route("/", get(home::<T>))
        .route("/actions/:action", get(action_page::<T>))
        .route("/session", post(sign_in::<T>))
        .route("/session/end", post(sign_out::<T>))
        .route("/credits", get(view_credit::<T>))
        .route("/credits/issue", post(issue::<T>))
        .route("/credits/transfer", post(transfer::<T>))
        .route("/credits/retire", post(retire::<T>))
        .route("/credits/location", post(update_location::<T>))
        .route("/transactions/:hash", get(transaction::<T>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(err: &ClientError) -> StatusCode {
    match err {
        ClientError::Input(_) => StatusCode::BAD_REQUEST,
        ClientError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ClientError::RemoteRead(_) | ClientError::Transaction(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn render<T: RpcTransport>(
    desk: &Desk<T>,
    status: StatusCode,
    notices: Vec<Notice>,
    body: &str,
) -> Response {
    let header = Header {
        operator: desk.session.as_ref().map(OperatorSession::address),
        total_issued: desk.client.total_issued().await.map_err(|e| e.to_string()),
    };
    (status, Html(html::page(&header, &notices, body))).into_response()
}

async fn home<T: RpcTransport>(State(state): State<Shared<T>>) -> Response {
    let desk = state.lock().await;
    render(&desk, StatusCode::OK, Vec::new(), "<p>Select an action above.</p>").await
}

async fn action_page<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Path(slug): Path<String>,
) -> Response {
    let desk = state.lock().await;
    let Ok(action) = slug.parse::<Action>() else {
        let notice = Notice::text(Tone::Error, &format!("Unknown action {slug:?}."));
        return render(&desk, StatusCode::NOT_FOUND, vec![notice], "").await;
    };
    let mut notices = Vec::new();
    if action.is_write() && desk.session.is_none() {
        notices.push(Notice::text(Tone::Warning, "Sign in with a private key before submitting."));
    }
    render(&desk, StatusCode::OK, notices, &html::action_form(action)).await
}

// ── Session ────────────────────────────────────────────────────────────

async fn sign_in<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Form(form): Form<SessionForm>,
) -> Response {
    let mut desk = state.lock().await;
    match OperatorSession::from_hex(&form.private_key) {
        Ok(session) => {
            info!(operator = %session.address(), "operator signed in");
            desk.session = Some(session);
            let notice = Notice::text(Tone::Success, "Signed in.");
            render(&desk, StatusCode::OK, vec![notice], "<p>Select an action above.</p>").await
        }
        Err(err) => {
            warn!(error = %err, "sign-in rejected");
            render(&desk, status_for(&err), vec![Notice::error(&err)], "").await
        }
    }
}

async fn sign_out<T: RpcTransport>(State(state): State<Shared<T>>) -> Response {
    let mut desk = state.lock().await;
    if let Some(session) = desk.session.take() {
        info!(operator = %session.address(), "operator signed out");
    }
    let notice = Notice::text(Tone::Info, "Signed out. The key has been discarded.");
    render(&desk, StatusCode::OK, vec![notice], "").await
}

fn signed_in<T>(desk: &Desk<T>) -> Result<&OperatorSession, ClientError> {
    desk.session
        .as_ref()
        .ok_or_else(|| ClientError::Input("sign in first: no private key has been entered".into()))
}

// ── Reads ──────────────────────────────────────────────────────────────

async fn view_credit<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let desk = state.lock().await;
    let form = html::action_form(Action::View);
    let Some(raw) = query.id.filter(|id| !id.trim().is_empty()) else {
        return render(&desk, StatusCode::OK, Vec::new(), &form).await;
    };

    let outcome = match parse_id(&raw) {
        Ok(id) => desk.client.credit(id).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(credit) => {
            let body = format!("{}{form}", html::credit_table(&credit));
            render(&desk, StatusCode::OK, Vec::new(), &body).await
        }
        Err(err) => {
            warn!(id = %raw, error = %err, "credit lookup failed");
            render(&desk, status_for(&err), vec![Notice::error(&err)], &form).await
        }
    }
}

async fn transaction<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Path(raw): Path<String>,
) -> Response {
    let desk = state.lock().await;
    let outcome = match TxHash::parse(&raw) {
        Ok(hash) => desk
            .client
            .transaction_receipt(&hash)
            .await
            .map(|receipt| (hash, receipt)),
        Err(err) => Err(err.into()),
    };
    match outcome {
        Ok((hash, receipt)) => {
            let link = desk.client.explorer_link(&hash);
            let body = html::receipt_view(&hash, receipt.as_ref(), &link);
            render(&desk, StatusCode::OK, Vec::new(), &body).await
        }
        Err(err) => render(&desk, status_for(&err), vec![Notice::error(&err)], "").await,
    }
}

// ── Writes ─────────────────────────────────────────────────────────────

async fn finish<T: RpcTransport>(
    desk: &Desk<T>,
    action: Action,
    done: &str,
    outcome: Result<TxHash, ClientError>,
) -> Response {
    let form = html::action_form(action);
    match outcome {
        Ok(hash) => {
            let link = desk.client.explorer_link(&hash);
            let notice = Notice::submitted(done, &hash, &link);
            render(desk, StatusCode::OK, vec![notice], &form).await
        }
        Err(err) => {
            warn!(action = action.slug(), error = %err, "action failed");
            render(desk, status_for(&err), vec![Notice::error(&err)], &form).await
        }
    }
}

async fn submit_issue<T: RpcTransport>(desk: &Desk<T>, form: &IssueForm) -> Result<TxHash, ClientError> {
    let session = signed_in(desk)?;
    let to = parse_address(&form.to)?;
    let amount = parse_amount(&form.amount)?;
    desk.client
        .issue_credit(session, to, amount, form.location.trim())
        .await
}

async fn submit_transfer<T: RpcTransport>(
    desk: &Desk<T>,
    form: &TransferForm,
) -> Result<TxHash, ClientError> {
    let session = signed_in(desk)?;
    let id = parse_id(&form.id)?;
    let to = parse_address(&form.to)?;
    let amount = parse_amount(&form.amount)?;
    desk.client.transfer_credit(session, id, to, amount).await
}

async fn submit_retire<T: RpcTransport>(desk: &Desk<T>, form: &RetireForm) -> Result<TxHash, ClientError> {
    let session = signed_in(desk)?;
    let id = parse_id(&form.id)?;
    desk.client.retire_credit(session, id).await
}

async fn submit_location<T: RpcTransport>(
    desk: &Desk<T>,
    form: &LocationForm,
) -> Result<TxHash, ClientError> {
    let session = signed_in(desk)?;
    let id = parse_id(&form.id)?;
    desk.client
        .update_credit_location(session, id, form.new_location.trim())
        .await
}

async fn issue<T: RpcTransport>(State(state): State<Shared<T>>, Form(form): Form<IssueForm>) -> Response {
    let desk = state.lock().await;
    let outcome = submit_issue(&desk, &form).await;
    finish(&desk, Action::Issue, "Credit issued.", outcome).await
}

async fn transfer<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Form(form): Form<TransferForm>,
) -> Response {
    let desk = state.lock().await;
    let outcome = submit_transfer(&desk, &form).await;
    finish(&desk, Action::Transfer, "Credit transferred.", outcome).await
}

async fn retire<T: RpcTransport>(State(state): State<Shared<T>>, Form(form): Form<RetireForm>) -> Response {
    let desk = state.lock().await;
    let outcome = submit_retire(&desk, &form).await;
    finish(&desk, Action::Retire, "Credit retired.", outcome).await
}

async fn update_location<T: RpcTransport>(
    State(state): State<Shared<T>>,
    Form(form): Form<LocationForm>,
) -> Response {
    let desk = state.lock().await;
    let outcome = submit_location(&desk, &form).await;
    finish(&desk, Action::UpdateLocation, "Location updated.", outcome).await
}

// ── Health ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
