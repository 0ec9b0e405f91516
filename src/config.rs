use anyhow::Context;

/// Gateway configuration, read from the environment.
///
/// | Variable                | Default                  |
/// |-------------------------|--------------------------|
/// | HOST                    | 127.0.0.1                |
/// | PORT                    | 3000                     |
/// | MCP_SERVER_VERSION      | crate version            |
/// | MCP_SERVER_INSTRUCTIONS | (none)                   |
/// | MCP_AUTH_USER           | 1234567890               |
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub server_version: String,
    pub server_instructions: Option<String>,
    pub auth_user: String,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;
        let server_version = std::env::var("MCP_SERVER_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
        let server_instructions = std::env::var("MCP_SERVER_INSTRUCTIONS")
            .ok()
            .filter(|s| !s.is_empty());
        let auth_user =
            std::env::var("MCP_AUTH_USER").unwrap_or_else(|_| "1234567890".to_string());

        Ok(Self {
            host,
            port,
            server_version,
            server_instructions,
            auth_user,
        })
    }
}
