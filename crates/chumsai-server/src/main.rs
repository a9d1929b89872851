mod api;
mod middleware;

use chumsai_line::LineClient;
use chumsai_source::DataSource;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = chumsai_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let credentials = config.line_credentials()?;
    let source = DataSource::from_config(&config)?;
    let line = LineClient::new(
        &credentials.channel_access_token,
        config.http_timeout_secs,
        &config.user_agent,
    )?;

    let state = AppState::new(
        source,
        line,
        &credentials.channel_secret,
        config.search,
        &config.map_url,
    );
    let app = build_app(state);

    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        source = config.source.kind(),
        radius_km = config.search.radius_km,
        max_results = config.search.max_results,
        "chumsai-server listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
