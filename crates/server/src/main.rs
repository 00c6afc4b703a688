use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ttharvest_core::{CommandRunner, PromptTemplate};
use ttharvest_server::{AppState, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;
    let template = PromptTemplate::load(&config.prompt_path)
        .with_context(|| format!("Failed to load prompt template: {}", config.prompt_path.display()))?;
    let runner = CommandRunner::new(config.runner.clone(), ["run", config.model.as_str()]);

    info!("Model: {} run {}", config.runner, config.model);
    info!("Writing outputs to {}", config.output_dir.display());

    let app = router(AppState { runner, template, output_dir: config.output_dir.clone() });

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
