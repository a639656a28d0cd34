use crate::brain::Availability;
use crate::notify::Notifier;
use crate::pipeline::SessionPipeline;
use crate::types::*;
use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

const DEFAULT_TASK_LIMIT: usize = 20;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pipeline: Arc<SessionPipeline>,
    pub notifier: Notifier,
}

pub fn create_router(pipeline: Arc<SessionPipeline>, notifier: Notifier) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/events", get(events))
        .route("/api/status", get(get_status))
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/stats", get(task_stats))
        .with_state(AppState { pipeline, notifier })
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn default_stream() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

async fn chat(
    State(pipeline): State<Arc<SessionPipeline>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    if !req.stream {
        let resp = pipeline.process(&req.message, &req.history).await;
        return Json(resp).into_response();
    }

    debug!("streaming reply for '{}'", req.message);
    let events = pipeline
        .stream(req.message, req.history)
        .map(|event| Event::default().json_data(&event));

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

async fn events(State(notifier): State<Notifier>) -> Response {
    let rx = notifier.subscribe();
    debug!("event subscriber connected, {} listening", notifier.subscribers());

    let stream = BroadcastStream::new(rx).filter_map(|message| async move {
        match message {
            Ok(notification) => Some(Event::default().json_data(&notification)),
            Err(e) => {
                warn!("event subscriber fell behind: {}", e);
                None
            }
        }
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub brains: Availability,
    pub default_brain: BrainId,
    pub registered: Vec<BrainId>,
    pub worker_pool_size: usize,
}

async fn get_status(State(pipeline): State<Arc<SessionPipeline>>) -> impl IntoResponse {
    let brains = pipeline.gateway().availability().await;

    Json(StatusResponse {
        brains,
        default_brain: pipeline.default_brain(),
        registered: pipeline.gateway().registered(),
        worker_pool_size: pipeline.executor().pool().size(),
    })
}

#[derive(Debug, Deserialize)]
struct TasksQuery {
    limit: Option<usize>,
}

async fn list_tasks(
    State(pipeline): State<Arc<SessionPipeline>>,
    Query(query): Query<TasksQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_TASK_LIMIT);
    match pipeline.tasks().recent(limit) {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn task_stats(State(pipeline): State<Arc<SessionPipeline>>) -> Response {
    match pipeline.tasks().stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}
