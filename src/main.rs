use anyhow::{Context, Result};
use archive_gateway::platform::MediaMode;
use archive_gateway::{create_router, AppState, Config, OpenTokClient, VideoPlatform};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "archive-gateway", about = "Session and archive gateway for the video platform")]
struct Args {
    /// Configuration file (extension optional, missing file is fine)
    #[arg(long, default_value = "config/archive-gateway")]
    config: String,

    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.port = port;
    }

    info!("Archive Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Video platform: {}", cfg.platform.api_url);

    let client = OpenTokClient::new(cfg.credentials.clone(), &cfg.platform.api_url)
        .context("Invalid video platform URL")?;

    // Nothing is served until the session exists
    let session = client
        .create_session(MediaMode::Routed)
        .await
        .context("Failed to create session")?;
    info!("Session ready: {}", session.session_id);

    let platform: Arc<dyn VideoPlatform> = Arc::new(client);
    let state = AppState::new(platform, session, &cfg)?;
    let app = create_router(state, &cfg.service.public_dir);

    let addr = format!("{}:{}", cfg.service.bind, cfg.service.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://localhost:{}/", cfg.service.port);

    axum::serve(listener, app).await?;
    Ok(())
}
