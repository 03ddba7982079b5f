use gymdesk_api::{app, AppState};
use gymdesk_store::{Config, DbClient, StorageBackend};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymdesk_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Gymdesk API on port {}", config.server.port);

    let state = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            AppState::in_memory(config.vacation_policy, config.server.event_buffer)
        }
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database).await?;
            if config.database.run_migrations {
                db.migrate().await?;
            }
            AppState::postgres(&db, config.vacation_policy, config.server.event_buffer)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
