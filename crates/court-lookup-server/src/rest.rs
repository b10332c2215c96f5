//! HTTP REST API for case lookups.
//!
//! JSON shapes follow the browser front-end: every response carries a
//! `success` flag, with `data`/`history` on success and `error` otherwise.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use court_lookup::{CaseQuery, LookupService, QueryRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

/// Entries returned by the history endpoint.
pub const HISTORY_LIMIT: usize = 10;

const LOOKUP_FAILED: &str = "Failed to fetch case data. Please try again.";
const HISTORY_FAILED: &str = "Failed to fetch search history";

/// State shared by all handlers.
pub struct AppState {
    pub service: LookupService,
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/case-search", post(case_search))
        .route("/api/search-history", get(search_history))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until the process is stopped.
pub async fn start(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

/// Fields are optional here so a missing one is reported as invalid input.
#[derive(Debug, Deserialize)]
struct CaseSearchRequest {
    case_type: Option<String>,
    case_number: Option<String>,
    filing_year: Option<String>,
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "error": message })),
    )
}

fn history_entry(record: &QueryRecord) -> Value {
    json!({
        "case_type": record.query.case_type,
        "case_number": record.query.case_number,
        "filing_year": record.query.filing_year,
        "timestamp": record.query.timestamp,
    })
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn case_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CaseSearchRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("rejected case search body: {e}");
            return failure(StatusCode::BAD_REQUEST, &e.body_text());
        }
    };

    let query = match CaseQuery::new(
        req.case_type.as_deref().unwrap_or_default(),
        req.case_number.as_deref().unwrap_or_default(),
        req.filing_year.as_deref().unwrap_or_default(),
    ) {
        Ok(q) => q,
        Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    // Spawned so a panic in the pipeline becomes a 500 instead of a dropped connection.
    let service = state.service.clone();
    match tokio::spawn(async move { service.lookup(&query).await }).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": outcome.payload,
                "origin": outcome.origin,
            })),
        ),
        Err(e) => {
            tracing::error!("error in case search: {e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, LOOKUP_FAILED)
        }
    }
}

async fn search_history(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.service.history(HISTORY_LIMIT).await {
        Ok(records) => {
            let history: Vec<Value> = records.iter().map(history_entry).collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "history": history })),
            )
        }
        Err(e) => {
            tracing::error!("error fetching search history: {e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, HISTORY_FAILED)
        }
    }
}
