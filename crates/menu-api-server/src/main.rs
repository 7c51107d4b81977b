use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use menu_api_server::config::Settings;
use menu_api_server::database::{DbPool, Repository};
use menu_api_server::handlers::build_router;
use menu_api_server::services::MenuService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,menu_api_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting Menu API Server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // Initialize database pool
    let db_pool = DbPool::new(&settings.database).await?;
    info!("✅ Database connection established");

    // Wire dependencies explicitly: repository -> service -> router
    let repository = Arc::new(Repository::new(db_pool));
    let menu_service = Arc::new(MenuService::new(repository));

    let app = build_router(menu_service);

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
