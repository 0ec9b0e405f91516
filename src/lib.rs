pub mod auth;
pub mod builtin;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mcp;
pub mod model;
pub mod registry;
pub mod session;

pub use config::GatewayConfig;
pub use gateway::{router, GatewayState, LAST_EVENT_ID_HEADER, SESSION_ID_HEADER};
