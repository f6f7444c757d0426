//! Server entry point.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use inkforge_studio::{router, Engine, StudioConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inkforge_studio=info,inkforge_gemini=info")),
        )
        .init();

    let config = StudioConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let engine = Arc::new(Engine::new(config));
    let app = router(engine);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "inkforge studio listening");
    axum::serve(listener, app).await?;
    Ok(())
}
