use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::FilesystemMediaStore;
use tracing::{Level, info};

use server::config::AppConfig;
use server::mail::LogMailer;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    server::database::ensure_indexes(&db).await?;

    let media = FilesystemMediaStore::new(
        config.storage.root.clone(),
        config.storage.public_base_url.clone(),
        config.storage.max_upload_size,
    )
    .await?;

    let state = AppState {
        db,
        media: Arc::new(media),
        mailer: Arc::new(LogMailer),
        config: config.clone(),
    };

    let app = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
