use site_cms_api::app::{self, AppState};
use site_cms_api::config::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, MAIL_API_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_cms_api=info,tower_http=info".into()),
        )
        .init();

    let config = config().clone();
    tracing::info!("Starting Site CMS API in {:?} mode", config.environment);

    let port = config.api.port;
    let state = AppState::from_config(config)?;
    let app = app::router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Site CMS API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
