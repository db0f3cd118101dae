//! HTTP handlers for a hosted participant

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::Value;
use tracing::{debug, warn};

use super::ServerState;
use crate::channel::wire::{
    INTERNAL_ERROR, INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND,
    METHOD_SEND, Message, MessageRole, PARSE_ERROR, SendParams,
};

/// Create the participant router
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        // JSON-RPC entry point
        .route("/", post(handle_rpc))
        // Agent discovery
        .route("/.well-known/agent.json", get(agent_card))
        .with_state(state)
}

async fn agent_card(State(state): State<ServerState>) -> Json<Value> {
    Json(serde_json::json!({
        "name": state.card.name,
        "description": state.card.description,
        "url": state.card.url,
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": { "streaming": false },
        "defaultInputModes": ["text"],
        "defaultOutputModes": ["text"],
        "skills": [],
    }))
}

async fn handle_rpc(State(state): State<ServerState>, body: String) -> Json<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected unparseable request: {}", e);
            return Json(JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ));
        }
    };

    let id = request.id;
    if request.method != METHOD_SEND {
        return Json(JsonRpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("unknown method {}", request.method),
        ));
    }

    let params: Option<SendParams> = request
        .params
        .and_then(|p| serde_json::from_value(p).ok());
    let Some(text) = params.and_then(|p| p.message.joined_text()) else {
        return Json(JsonRpcResponse::failure(
            id,
            INVALID_PARAMS,
            "params.message must contain a text part",
        ));
    };

    debug!("{} received {} chars", state.card.name, text.len());
    match state.engine.generate(&text).await {
        Ok(reply) => Json(JsonRpcResponse::success(
            id,
            &Message::text(MessageRole::Agent, reply),
        )),
        Err(e) => {
            warn!("{} engine failed: {}", state.card.name, e);
            Json(JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()))
        }
    }
}
