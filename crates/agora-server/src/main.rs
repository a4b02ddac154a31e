mod config;
mod routes;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use agora_db::Database;
use agora_sync::{ChannelCache, Ingestor};

use crate::config::Config;
use crate::routes::AppStateInner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,agora_sync=debug,agora_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    // One channel cache for the whole process
    let cache = Arc::new(ChannelCache::new());
    let state = Arc::new(AppStateInner {
        db: db.clone(),
        ingestor: Ingestor::new(db, cache),
    });

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr = config.bind_addr()?;
    info!("Agora mirror listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
