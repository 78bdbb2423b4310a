//! Webhook ingestion: HTTP endpoint, delivery classification, and dispatch
//! to the board mirror and policy engine.
//!
//! One task per inbound delivery. The only caller-visible failure is a 400
//! for an invalid payload (bad signature or unparseable body); every other
//! outcome answers 200 whether or not any internal action was taken, and
//! failures surface only in the logs.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::errors::MirrorError;
use crate::github::webhook::{
    self, EVENT_HEADER, IssuesEvent, PayloadInvalid, ProjectCardEvent, SIGNATURE_HEADER,
};
use crate::mirror::BoardMirror;
use crate::policy::{AssignmentFact, PolicyEngine};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub mirror: Arc<BoardMirror>,
    pub policy: PolicyEngine,
    pub webhook_secret: String,
    pub organization: String,
}

pub type SharedState = Arc<AppState>;

// ── Router ────────────────────────────────────────────────────────────

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

fn bad_payload(err: PayloadInvalid) -> (StatusCode, String) {
    warn!("rejecting webhook delivery: {err}");
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Single webhook endpoint. Verifies the signature over the raw body,
/// classifies the delivery by the event header, and dispatches it.
async fn webhook_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = webhook::verify_signature(&state.webhook_secret, &body, signature) {
        return bad_payload(err);
    }

    let kind = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    match kind {
        "issues" => match serde_json::from_slice::<IssuesEvent>(&body) {
            Ok(event) => handle_issue_event(&state, event).await,
            Err(err) => return bad_payload(err.into()),
        },
        "project_card" => match serde_json::from_slice::<ProjectCardEvent>(&body) {
            Ok(event) => handle_card_event(&state, event).await,
            Err(err) => return bad_payload(err.into()),
        },
        // Every other event kind is accepted and ignored.
        _ => {}
    }

    (StatusCode::OK, String::new())
}

// ── Dispatch ──────────────────────────────────────────────────────────

async fn handle_issue_event(state: &AppState, event: IssuesEvent) {
    let fact = AssignmentFact::from_event(&event);
    info!(
        "issue \"{}\" {}: assignees {:?}",
        fact.title, fact.action, fact.assignees
    );
    state.policy.apply(&fact).await;
}

async fn handle_card_event(state: &AppState, event: ProjectCardEvent) {
    let in_target_org = event
        .organization
        .as_ref()
        .is_some_and(|org| org.login == state.organization);
    if !in_target_org {
        return;
    }

    let card = event.project_card;
    let card_id = card.id;
    info!("project card {card_id} {}", event.action);

    let result = match event.action.as_str() {
        "created" => state.mirror.append(card).await,
        "deleted" => state.mirror.remove(card_id).await,
        "converted" => state.mirror.replace(card).await,
        // A move usually touches a tracked card; a card created since the
        // last refresh shows up here first.
        "moved" => match state.mirror.replace(card.clone()).await {
            Err(MirrorError::CardNotFound { .. }) => state.mirror.append(card).await,
            other => other,
        },
        _ => Ok(()),
    };

    if let Err(err) = result {
        error!("failed to apply \"{}\" for card {card_id}: {err}", event.action);
    }
}

// ── Serving ───────────────────────────────────────────────────────────

/// Serve the webhook endpoint until ctrl-c.
pub async fn serve(state: SharedState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let local_addr = listener.local_addr()?;
    info!("boardbot listening on http://{local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("shutting down");
}
