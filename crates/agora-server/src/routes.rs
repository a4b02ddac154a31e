use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tracing::{error, info};

use agora_db::Database;
use agora_sync::{IngestOutcome, Ingestor, SyncOutcome};
use agora_types::api::{IngestResponse, SetAnswerRequest};
use agora_types::events::IngestEvent;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub ingestor: Ingestor<Arc<Database>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(ingest_event))
        .route("/posts/{post_id}", get(get_post))
        .route("/posts/{post_id}/answer", put(set_answer))
        .with_state(state)
}

fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Apply one feed event. Store failures return 500 so the feed can redeliver.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<IngestEvent>,
) -> Result<impl IntoResponse, StatusCode> {
    // rusqlite is blocking; keep it off the async runtime
    let outcome = tokio::task::spawn_blocking(move || state.ingestor.apply(&event))
        .await
        .map_err(join_error)?
        .map_err(|e| {
            error!("Ingestion failed: {:#}", anyhow::Error::new(e));
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let (status, label) = match outcome {
        IngestOutcome::MessageStored | IngestOutcome::Channel(SyncOutcome::Synced) => {
            (StatusCode::ACCEPTED, "stored")
        }
        IngestOutcome::Channel(SyncOutcome::Cached) => (StatusCode::OK, "cached"),
        IngestOutcome::Channel(SyncOutcome::Skipped) | IngestOutcome::Ignored => {
            (StatusCode::OK, "ignored")
        }
    };

    Ok((status, Json(IngestResponse { status: label })))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Response, StatusCode> {
    let db = state.db.clone();
    let thread = tokio::task::spawn_blocking(move || db.load_thread(&post_id))
        .await
        .map_err(join_error)?
        .map_err(|e| {
            error!("Failed to load thread: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let view = agora_thread::assemble_thread(&thread.post, thread.root.as_ref(), &thread.replies);
    Ok(Json(view).into_response())
}

/// Moderation hook: mark or clear the accepted answer of a post.
pub async fn set_answer(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<SetAnswerRequest>,
) -> Result<StatusCode, StatusCode> {
    let db = state.db.clone();
    let pid = post_id.clone();
    let answer = req.message_id.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.set_post_answer(&pid, answer.as_ref().map(|id| id.as_str()))
    })
    .await
    .map_err(join_error)?
    .map_err(|e| {
        error!("Failed to set answer on {}: {:#}", post_id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    match req.message_id {
        Some(id) => info!("Post {} answered by message {}", post_id, id),
        None => info!("Post {} answer cleared", post_id),
    }
    Ok(StatusCode::NO_CONTENT)
}
