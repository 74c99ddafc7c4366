use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};

use incident_chat_core::ConfigLoadError;

use crate::dataset::IncidentStore;
use crate::error::{ServerError, ServerResult};
use crate::planner::ToolPlanner;
use crate::tools::run_tool;

pub const REFUSAL: &str = "I can answer questions related to incident tickets only.";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: IncidentStore,
    pub planner: Arc<dyn ToolPlanner>,
}

impl AppStateInner {
    pub fn new(store: IncidentStore, planner: Arc<dyn ToolPlanner>) -> AppState {
        Arc::new(Self { store, planner })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: Value,
}

async fn api_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Some(call) = state.planner.plan(&request.message).await? else {
        info!("no tool call planned, refusing");
        return Ok(Json(ChatResponse {
            reply: Value::String(REFUSAL.to_string()),
        }));
    };

    info!(tool = %call.name, arguments = %call.arguments, "running tool");
    let reply = run_tool(&state.store, &call.name, &call.arguments)?;
    Ok(Json(ChatResponse { reply }))
}

async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "tickets": state.store.len()
    }))
}

/// Single-origin CORS with credentials. Requests from any other origin get no
/// `access-control-allow-origin` header. Methods and headers are mirrored
/// since wildcards are rejected alongside credentials.
pub fn cors_layer(allowed_origin: &str) -> ServerResult<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|e| {
        ServerError::Config(ConfigLoadError::InvalidValue {
            key: "server.allowed_origin".to_string(),
            message: e.to_string(),
        })
    })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(state: AppState, allowed_origin: &str) -> ServerResult<Router> {
    Ok(Router::new()
        .route("/chat", post(api_chat))
        .route("/health", get(api_health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(allowed_origin)?)
        .with_state(state))
}

pub async fn serve(listener: TcpListener, app: Router) -> ServerResult<()> {
    info!("chat service listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
