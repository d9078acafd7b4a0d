use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use listing_lens::config::Args;
use listing_lens::{AppState, FileSource, router};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr = args.socket_addr();

    let source = FileSource::new(args.data);
    log::info!("serving listings from {}", source.path().display());
    let app = router(AppState::new(Arc::new(source)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            log::info!("shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
