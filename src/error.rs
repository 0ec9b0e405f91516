use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the capability registries.
///
/// `NotFound` is the only variant that surfaces during request dispatch;
/// it is translated to an MCP protocol error at the JSON-RPC boundary and
/// must never escape as a process fault. The other variants fail fast at
/// registration time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entry with the given key exists in the registry.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// An entry with the same key is already registered.
    ///
    /// Registration rejects duplicates instead of shadowing earlier
    /// entries, so lookup results never depend on registration order.
    #[error("{kind} already registered: {key}")]
    AlreadyRegistered { kind: &'static str, key: String },

    /// A resource descriptor broke the uri-XOR-template invariant.
    #[error("resource '{0}' must carry either a uri or a uriTemplate, never both or neither")]
    InvalidDescriptor(String),
}

/// Convert RegistryError to rmcp::ErrorData for MCP protocol responses
///
/// | RegistryError Variant | MCP Error Code   | Reason                        |
/// |-----------------------|------------------|-------------------------------|
/// | NotFound              | METHOD_NOT_FOUND | Requested capability missing  |
/// | AlreadyRegistered     | INVALID_PARAMS   | Caller re-registered a key    |
/// | InvalidDescriptor     | INVALID_PARAMS   | Descriptor violates invariant |
impl From<RegistryError> for rmcp::ErrorData {
    fn from(err: RegistryError) -> Self {
        use rmcp::model::{ErrorCode, ErrorData};

        let code = match err {
            RegistryError::NotFound { .. } => ErrorCode::METHOD_NOT_FOUND,
            RegistryError::AlreadyRegistered { .. } | RegistryError::InvalidDescriptor(_) => {
                ErrorCode::INVALID_PARAMS
            }
        };

        ErrorData {
            code,
            message: err.to_string().into(),
            data: None,
        }
    }
}

/// Authentication errors for the bootstrap path.
///
/// A failure here aborts session creation before any session or server
/// state exists; nothing is left behind to clean up.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthorizationHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    InvalidAuthorizationFormat,

    #[error("Invalid access token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_code, description) = match self {
            AuthError::MissingAuthorizationHeader => {
                ("missing_token", "Authorization header is required")
            }
            AuthError::InvalidAuthorizationFormat => (
                "invalid_request",
                "Authorization header must be 'Bearer <token>'",
            ),
            AuthError::InvalidToken => ("invalid_token", "The access token is invalid"),
        };

        let body = json!({
            "error": error_code,
            "error_description": description,
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Transport-level failures the router has to surface.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport was closed; in-flight requests fail instead of hanging.
    #[error("transport closed")]
    Closed,
}

/// Top-level error type for the gateway's HTTP handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Session not found")]
    SessionNotFound,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Auth(err) => err.into_response(),
            GatewayError::Transport(TransportError::Closed) => {
                let body = json!({
                    "error": "session_closed",
                    "error_description": "The session's transport has been closed",
                });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            GatewayError::SessionNotFound => {
                let body = json!({
                    "error": "session_not_found",
                    "error_description": "No session matches the mcp-session-id header",
                });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
        }
    }
}
