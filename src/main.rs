use std::sync::Arc;

use anyhow::{Context, Result};

use snapdoc::cnfg::AppConfig;
use snapdoc::render::ChromeRenderer;
use snapdoc::routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Arc::new(AppConfig::from_env()?);
    let renderer = Arc::new(ChromeRenderer::new(&config));
    let app = routes::app(Arc::clone(&config), renderer)?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
