use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use dealer_catalog::config::environment::EnvironmentConfig;
use dealer_catalog::routes::create_router;
use dealer_catalog::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("🚗 Dealer Catalog API");
    info!("================================================");
    info!("🌍 Environment: {}", config.environment);

    let app_state = match AppState::from_config(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Could not open the catalog storage: {}", e);
            return Err(anyhow::anyhow!("Storage error: {}", e));
        }
    };

    let app = create_router(app_state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Server starting on http://{}", addr);
    info!("🔍 Available endpoints:");
    info!("   GET    /api/health - Health check");
    info!("   GET    /api/vehicles - Filtered, paginated catalog");
    info!("   GET    /api/vehicles/:id - Vehicle detail");
    info!("🔧 Admin endpoints:");
    info!("   GET    /api/admin/vehicles - Full listing");
    info!("   POST   /api/admin/vehicles - Create vehicle (multipart)");
    info!("   PUT    /api/admin/vehicles/:id - Update vehicle (multipart)");
    info!("   DELETE /api/admin/vehicles/:id - Delete vehicle and its images");
    info!("   DELETE /api/admin/vehicles/:id/images - Delete one image");
    info!("🖼️ Static uploads served under /uploads");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
