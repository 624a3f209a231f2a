use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use pdf_qa_core::{answer, ChatResponse, DoorScheduleResponse, TextIndex};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{debug, info};

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Shared, read-only request state.
pub struct AppState {
    pub index: Arc<TextIndex>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoorScheduleRequest {
    #[serde(default)]
    pub query: Option<String>,
}

pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|error| anyhow::anyhow!("invalid CORS origin {origin}: {error}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(index: Arc<TextIndex>, cors: CorsLayer) -> Router {
    let state = Arc::new(AppState { index });

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/door-schedule", post(door_schedule))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|error| anyhow::anyhow!("failed to bind {addr}: {error}"))?;
    info!(%addr, "pdf-qa listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = answer::chat(&state.index, &payload.message);
    debug!(citations = response.citations.len(), "chat answered");
    Json(response)
}

async fn door_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DoorScheduleRequest>,
) -> Json<DoorScheduleResponse> {
    let response = answer::door_schedule(&state.index, payload.query.as_deref());
    debug!(rows = response.rows.len(), "door schedule extracted");
    Json(response)
}
