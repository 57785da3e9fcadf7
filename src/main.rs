use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use estoque_server::config::{init_tracing, load_config};
use estoque_server::db;
use estoque_server::events::{process_events, EventSender};
use estoque_server::server;
use estoque_server::services::AppServices;
use estoque_server::store::{InventoryStore, MemoryStore, SqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "Starting inventory server");

    let (event_tx, event_rx) = tokio::sync::mpsc::channel(config.event_channel_capacity);
    tokio::spawn(process_events(event_rx));
    let events = EventSender::new(event_tx);

    let store: Arc<dyn InventoryStore> = if config.uses_database() {
        let pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to the database")?;
        if config.auto_migrate {
            db::run_migrations(&pool)
                .await
                .context("failed to run database migrations")?;
        }
        db::check_connection(&pool)
            .await
            .context("database did not answer a ping")?;
        info!("Persistence backend: database");
        Arc::new(SqlStore::new(Arc::new(pool)))
    } else {
        info!("Persistence backend: memory");
        Arc::new(MemoryStore::new())
    };

    let services = Arc::new(AppServices::new(store, events));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let read_timeout = config.client_read_timeout_secs.map(Duration::from_secs);

    server::serve(listener, services, read_timeout).await?;
    info!("Server stopped");
    Ok(())
}
