mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use sibyl_core::config::SibylCfg;
use sibyl_core::durable::{DurableStore, NoopDurableStore, PgDurableStore};
use sibyl_core::error::ConfigError;
use sibyl_core::gateway::CompletionGateway;
use sibyl_core::identity::{EnvTokenIdentity, IdentityProvider};
use sibyl_core::memory::{FileSessionStore, MemorySessionStore, SessionStore};
use sibyl_core::modules::ModuleRegistry;
use sibyl_core::orchestrator::Orchestrator;
use sibyl_llm::provider::LlmProvider;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

const DB_CONNECT_TIMEOUT_SECS: u64 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_target(true))
        .init();

    let cfg = Arc::new(SibylCfg::from_env());

    // Missing provider credentials are fatal before any request is served.
    let provider = sibyl_llm::http::from_env()
        .ok_or(ConfigError::MissingEnv("SIBYL_LLM_MODEL / SIBYL_LLM_API_KEY"))?;
    tracing::info!(name = provider.name(), "LLM provider initialized");
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);

    // DATABASE_URL (optional — no DB = event/memory records dropped)
    let durable: Arc<dyn DurableStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let connect = tokio::time::timeout(
                Duration::from_secs(DB_CONNECT_TIMEOUT_SECS),
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(8)
                    .connect(&url),
            )
            .await;
            match connect {
                Ok(Ok(pool)) => match sqlx::migrate!("../../migrations").run(&pool).await {
                    Ok(()) => {
                        tracing::info!("database connected and migrations applied");
                        Arc::new(PgDurableStore::new(pool))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "database migration failed — durable logging disabled");
                        Arc::new(NoopDurableStore)
                    }
                },
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "could not connect DATABASE_URL — durable logging disabled");
                    Arc::new(NoopDurableStore)
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = DB_CONNECT_TIMEOUT_SECS,
                        "database connect timed out — durable logging disabled"
                    );
                    Arc::new(NoopDurableStore)
                }
            }
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set — durable logging disabled");
            Arc::new(NoopDurableStore)
        }
    };

    let store: Arc<dyn SessionStore> = match &cfg.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir, "file-backed session store");
            Arc::new(FileSessionStore::new(
                dir,
                cfg.session_max_turns,
                cfg.session_ttl_secs,
            ))
        }
        None => Arc::new(MemorySessionStore::new(
            cfg.session_max_turns,
            cfg.session_ttl_secs,
            cfg.session_capacity,
        )),
    };

    let registry = ModuleRegistry::standard()?;
    let gateway = CompletionGateway::new(provider, cfg.request_timeout_secs);
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&cfg),
        registry,
        store,
        gateway,
        durable,
    ));
    let identity: Arc<dyn IdentityProvider> = Arc::new(EnvTokenIdentity::from_env());

    let state = AppState {
        orchestrator,
        identity,
        cfg: Arc::clone(&cfg),
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "sibyl listening");

    let token = CancellationToken::new();
    spawn_sigint_canceler(token.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn spawn_sigint_canceler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}
