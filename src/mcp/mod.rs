//! Per-session MCP protocol units and their plumbing.
//!
//! - [`ServerAssembler`] - freezes registry contents into a protocol unit
//! - [`McpServer`] - one session's unit: capability advertisement plus
//!   JSON-RPC dispatch over the frozen snapshot
//! - [`StreamableHttpTransport`] - single request/response transport with
//!   a close hook and event-log-backed notification replay
//! - [`EventLog`] / [`InMemoryEventLog`] - resumable delivery support

pub mod assembler;
pub mod event_log;
pub mod server;
pub mod transport;

pub use assembler::ServerAssembler;
pub use event_log::{EventId, EventLog, InMemoryEventLog, StreamId};
pub use server::{McpServer, RequestContext};
pub use transport::{HttpTransportFactory, StreamableHttpTransport, TransportFactory};
