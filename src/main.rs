use std::net::SocketAddr;
use std::sync::Arc;

use vestibule::auth::StaticAuthResolver;
use vestibule::builtin::{CallMePrompt, GreeterTool, UserIdResource, UserIdTemplate};
use vestibule::mcp::{HttpTransportFactory, InMemoryEventLog, ServerAssembler};
use vestibule::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};
use vestibule::session::InMemorySessionStore;
use vestibule::{GatewayConfig, GatewayState};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vestibule=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    // Capability registries
    let tools = Arc::new(ToolRegistry::new());
    tools.register(Arc::new(GreeterTool::new())).await?;

    let prompts = Arc::new(PromptRegistry::new());
    prompts.register(Arc::new(CallMePrompt::new())).await?;

    let resources = Arc::new(ResourceRegistry::new());
    resources.register(Arc::new(UserIdResource::new())).await?;
    resources.register(Arc::new(UserIdTemplate::new())).await?;

    let assembler = Arc::new(
        ServerAssembler::new(
            config.server_version.clone(),
            config.server_instructions.clone(),
        )
        .with_tools(tools)
        .with_prompts(prompts)
        .with_resources(resources),
    );

    let event_log = Arc::new(InMemoryEventLog::new());
    let state = GatewayState {
        sessions: Arc::new(InMemorySessionStore::new()),
        auth: Arc::new(StaticAuthResolver::new(config.auth_user.clone())),
        assembler,
        transports: Arc::new(HttpTransportFactory::new(event_log.clone())),
        event_log,
    };

    let app = vestibule::router(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    tracing::info!("Gateway running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
