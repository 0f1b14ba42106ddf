use tokio::signal;
use tracing_subscriber::EnvFilter;

mod api_error;
mod call_view;
mod chat_view;
mod config;
mod contact_view;
mod db;
mod login_view;
mod manager;
mod router;
mod utils;

const DEFAULT_LOG_FILTER: &str = "messenger_backend=info,tower_http=info";

pub struct AppState {
    pub pool: sqlx::SqlitePool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let pool = db::connect(&config).await?;
    let app = router::app(pool.clone());

    tracing::info!(address = %config.bind_addr, "messenger backend listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
