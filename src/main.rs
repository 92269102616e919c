use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use themis::adapters::api_handler::ApiState;
use themis::adapters::health_handler::HealthHandler;
use themis::adapters::jira_client::JiraHttpClient;
use themis::adapters::jira_gateway::JiraGateway;
use themis::adapters::tool_handler::JiraToolHandler;
use themis::agents::domain::AgentPort;
use themis::agents::handler::AgentHandler;
use themis::agents::llm::{LlmProvider, OpenAiProvider};
use themis::agents::triage::TriageEngine;
use themis::cli::Cli;
use themis::config::Settings;
use themis::domain::{JiraApi, ToolPort};
use themis::persistence::{self, ConnectionPool, RequestLogRepository, SqlxRequestLogRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    let default_filter = if settings.agent.verbose {
        "themis=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let host = settings.server.host.clone();
    let port = settings.server.port;
    info!("Starting Themis Jira agent service on {}:{}", host, port);

    // Persistence
    let pool = ConnectionPool::new(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.connect_timeout_secs,
    )
    .await?;
    persistence::migrations::run(&pool).await?;

    // Jira side
    let jira_api: Arc<dyn JiraApi> = Arc::new(JiraHttpClient::new(&settings.jira)?);
    let gateway = Arc::new(JiraGateway::new(
        jira_api,
        settings.jira.project_key.clone(),
    ));

    // Model side
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(&settings.llm)?);

    // Agent composition: triage engine as a tool next to the gateway tools
    let triage = Arc::new(TriageEngine::new(gateway.clone(), provider.clone()));
    let tools: Arc<dyn ToolPort> = Arc::new(JiraToolHandler::new(gateway.clone(), triage));
    let agent: Arc<dyn AgentPort> = Arc::new(AgentHandler::new(
        settings.agent.clone(),
        provider,
        tools,
    ));

    let records: Arc<dyn RequestLogRepository> =
        Arc::new(SqlxRequestLogRepository::new(pool.clone()));
    let health_handler = Arc::new(HealthHandler::new(pool));

    let api_state = ApiState {
        agent,
        records,
        gateway,
    };
    let app = themis::create_app(api_state, health_handler);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
