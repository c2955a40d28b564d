use crate::agent::{ AgentError, KaggleAgent };
use crate::models::chat::ChatRequest;
use crate::tools::{ self, ResourceError, ToolCall };

use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Query },
    response::IntoResponse,
    http::StatusCode,
};
use log::{ info, error };
use serde::{ Deserialize, Serialize };
use serde_json::json;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{ Any, CorsLayer };

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<KaggleAgent>,
}

pub fn build_router(agent: Arc<KaggleAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/v1/chat/completions", post(chat_completions_handler))
        .route("/v1/tools", get(list_tools_handler))
        .route("/v1/tools/call", post(call_tool_handler))
        .route("/v1/resources", get(read_resource_handler))
        .route("/v1/prompts/explore-dataset", get(explore_prompt_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<KaggleAgent>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = build_router(agent);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Kaggle bridge server is running" }))
}

async fn chat_completions_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>
) -> impl IntoResponse {
    match state.agent.handle_chat(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(err @ AgentError::NoUserMessage) =>
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { detail: err.to_string() }),
            ).into_response(),
        Err(err @ AgentError::Upstream(_)) => {
            error!("Chat request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { detail: err.to_string() }),
            ).into_response()
        }
    }
}

async fn list_tools_handler() -> impl IntoResponse {
    Json(tools::list_tools())
}

async fn call_tool_handler(
    State(state): State<AppState>,
    Json(call): Json<ToolCall>
) -> impl IntoResponse {
    Json(tools::call_tool(&state.agent, &call).await)
}

#[derive(Deserialize)]
struct ResourceQuery {
    uri: String,
}

async fn read_resource_handler(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>
) -> impl IntoResponse {
    match tools::read_resource(&state.agent, &query.uri).await {
        Ok(text) => text.into_response(),
        Err(err @ ResourceError::UnsupportedUri(_)) =>
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { detail: err.to_string() }),
            ).into_response(),
        Err(err @ ResourceError::Upstream(_)) => {
            error!("Resource request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { detail: err.to_string() }),
            ).into_response()
        }
    }
}

#[derive(Deserialize)]
struct ExplorePromptQuery {
    dataset_ref: String,
}

async fn explore_prompt_handler(Query(query): Query<ExplorePromptQuery>) -> impl IntoResponse {
    tools::explore_dataset_prompt(&query.dataset_ref)
}
