//! Airline customer service agents
//!
//! An HTTP backend that routes each customer message through a triage agent
//! and four specialists, persisting which agent owns the conversation.

mod agents;
mod api;
mod config;
mod db;
mod llm;
mod runtime;
mod state_machine;
mod tools;

use api::{create_router, AppState};
use axum::http::HeaderValue;
use config::{ServerConfig, StoreLocation};
use db::{Database, MemoryStore};
use llm::{LlmConfig, ModelRegistry};
use runtime::{
    ConversationManager, ConversationStore, DatabaseStore, ExecutorConfig, LlmClient,
    RegistryLlmClient, RetryingLlmClient, ToolExecutor, WorkflowExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::ToolRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airline_agents=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env();

    // Conversation store
    let store: Arc<dyn ConversationStore> = match &config.store {
        StoreLocation::Memory => {
            tracing::info!("Using in-memory conversation store");
            Arc::new(MemoryStore::new())
        }
        StoreLocation::Sqlite(path) => {
            tracing::info!(path = %path.display(), "Opening database");
            Arc::new(DatabaseStore::new(Database::open(path)?))
        }
    };

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM configured. Set OPENAI_API_KEY or CUSTOM_LLM_BASE_URL.");
    }

    let llm: Arc<dyn LlmClient> = Arc::new(RetryingLlmClient::new(
        RegistryLlmClient::new(llm_registry.clone(), llm_registry.default_model_id().to_string()),
        config.llm_max_attempts,
    ));
    let tools: Arc<dyn ToolExecutor> =
        Arc::new(ToolRegistry::standard().with_timeout(config.tool_timeout));
    let executor = WorkflowExecutor::new(
        llm,
        tools,
        ExecutorConfig {
            max_hops: config.max_hops,
        },
    );

    let state = AppState {
        manager: Arc::new(ConversationManager::new(store, executor)),
        llm_registry,
    };

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(max_hops = config.max_hops, "Airline agents server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
