mod api;
mod event;
mod router;
mod startup;
mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    itemflow_core::config::load_dotenv();
    let config = itemflow_core::Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let state = startup::build_state(config).await?;
    startup::spawn_background_tasks(state.clone());

    let addr = state.config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("itemflow listening on {}", addr);
    axum::serve(listener, router::build_router(state)).await?;
    Ok(())
}
