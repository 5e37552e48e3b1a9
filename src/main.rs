use anyhow::{Context, Result};
use clap::Parser;
use openvidu_bridge::{
    create_router, AppState, Config, HttpControlPlane, OpenVidu, RegistrySync, WebhookDispatcher,
    WebhookSubscriber,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HTTP bridge to an OpenVidu media server
#[derive(Debug, Parser)]
#[command(name = "openvidu-bridge", version)]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/openvidu-bridge")]
    config: String,

    /// Override service.http.bind
    #[arg(long)]
    bind: Option<String>,

    /// Override service.http.port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("OpenVidu server: {}", cfg.openvidu.url);

    let control = HttpControlPlane::new(&cfg.openvidu)
        .context("Failed to create OpenVidu HTTP client")?;
    let openvidu = Arc::new(OpenVidu::new(Arc::new(control)));

    let subscribers: Vec<Arc<dyn WebhookSubscriber>> =
        vec![Arc::new(RegistrySync::new(Arc::clone(&openvidu)))];
    let webhooks = Arc::new(WebhookDispatcher::new(subscribers, cfg.webhook.lane_idle()));

    let state = AppState::new(openvidu, webhooks, cfg.openvidu.unknown_keys());
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
