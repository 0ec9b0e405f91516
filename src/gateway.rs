use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{extract_bearer_token, AuthenticationResolver};
use crate::error::GatewayError;
use crate::mcp::{EventLog, ServerAssembler, TransportFactory};
use crate::session::SessionStore;

/// Header carrying the session id on every exchange after bootstrap.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Header a reconnecting client sends to resume event delivery.
pub const LAST_EVENT_ID_HEADER: &str = "last-event-id";

/// Shared state for the gateway's HTTP handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: Arc<dyn SessionStore>,
    pub auth: Arc<dyn AuthenticationResolver>,
    pub assembler: Arc<ServerAssembler>,
    pub transports: Arc<dyn TransportFactory>,
    pub event_log: Arc<dyn EventLog>,
}

/// Builds the gateway router: a single `/mcp` endpoint speaking
/// streamable HTTP, with request tracing and permissive CORS.
pub fn router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/mcp", post(post_mcp).get(get_mcp).delete(delete_mcp))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// POST /mcp - the main request path.
///
/// A recognized `mcp-session-id` header routes straight to the stored
/// session, skipping authentication. Anything else - no header, or a
/// stale id from a closed session - goes through the bootstrap path:
/// resolve the bearer token, mint a fresh id, assemble a unit, store
/// the session, then dispatch the message that triggered it all.
async fn post_mcp(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Result<Response, GatewayError> {
    if let Some(session_id) = header_str(&headers, SESSION_ID_HEADER) {
        if let Some(session) = state.sessions.restore(&session_id).await {
            tracing::debug!(session_id = %session_id, "reusing existing session");
            let reply = session
                .transport
                .handle_request(&session.server, message)
                .await?;
            return Ok(mcp_response(&session.session_id, reply));
        }
        tracing::debug!(session_id = %session_id, "unknown session id, bootstrapping");
    }

    let token = extract_bearer_token(&headers)?;
    let user_id = state.auth.resolve(&token).await?;
    let session_id = state.sessions.generate_id();

    let server = Arc::new(state.assembler.assemble(&user_id, &session_id).await);
    let transport = state.transports.create(&session_id);

    // Transport close tears the session record down, wherever the close
    // originates.
    {
        let sessions = Arc::clone(&state.sessions);
        let session_id = session_id.clone();
        transport
            .on_close(move || async move { sessions.delete(&session_id).await })
            .await;
    }

    let session = state
        .sessions
        .create(&session_id, &user_id, server, transport)
        .await;
    session.server.connect(Arc::clone(&session.transport)).await;
    if let Some(resources) = state.assembler.resources() {
        let sink: Arc<dyn crate::registry::UpdateSink> = session.transport.clone();
        resources.bind_sink(sink).await;
    }

    let reply = session
        .transport
        .handle_request(&session.server, message)
        .await?;
    Ok(mcp_response(&session.session_id, reply))
}

/// GET /mcp - replays queued server-to-client events for a session.
///
/// With a `last-event-id` header only events stored after that id on
/// the session's own stream are returned; otherwise the whole stream
/// is.
async fn get_mcp(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let session_id =
        header_str(&headers, SESSION_ID_HEADER).ok_or(GatewayError::SessionNotFound)?;
    let session = state
        .sessions
        .restore(&session_id)
        .await
        .ok_or(GatewayError::SessionNotFound)?;

    let events = match header_str(&headers, LAST_EVENT_ID_HEADER) {
        Some(last_event_id) => {
            match state.event_log.replay_events_after(&last_event_id).await {
                Some((stream_id, events)) if stream_id == session_id => events,
                // Unknown event ids and ids belonging to another
                // session's stream replay nothing.
                _ => Vec::new(),
            }
        }
        None => state.event_log.replay_stream(&session_id).await,
    };

    let events: Vec<Value> = events
        .into_iter()
        .map(|(id, message)| json!({ "id": id, "message": message }))
        .collect();
    Ok(mcp_response(
        &session.session_id,
        Some(json!({ "events": events })),
    ))
}

/// DELETE /mcp - closes the session's transport, which in turn removes
/// the session from the store via the close hook.
async fn delete_mcp(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let session_id =
        header_str(&headers, SESSION_ID_HEADER).ok_or(GatewayError::SessionNotFound)?;
    let session = state
        .sessions
        .restore(&session_id)
        .await
        .ok_or(GatewayError::SessionNotFound)?;

    session.transport.close().await;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn mcp_response(session_id: &str, reply: Option<Value>) -> Response {
    let mut response = match reply {
        Some(body) => Json(body).into_response(),
        // Notifications produce no response body.
        None => StatusCode::ACCEPTED.into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(SESSION_ID_HEADER), value);
    }
    response
}
