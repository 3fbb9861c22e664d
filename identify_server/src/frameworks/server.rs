// Framework bootstrap for the identification relay.

use crate::frameworks::config;
use crate::interface_adapters::clients::ReqwestTransport;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use std::io::{Error, ErrorKind, Result};
use std::net::SocketAddr;
use std::sync::Arc;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serves the relay on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener.local_addr()?;
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let state = build_state()?;

    let address = SocketAddr::new(config::bind_addr(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state).await
}

fn build_state() -> Result<Arc<AppState>> {
    let settings = config::identify_settings().map_err(|e| {
        tracing::error!(error = %e, "invalid upstream configuration");
        Error::new(ErrorKind::InvalidInput, e)
    })?;
    let timeouts = config::transport_timeouts();

    tracing::info!(
        upstream = %settings.target.name,
        endpoint = %settings.target.endpoint,
        availability_check = settings.availability_check,
        max_attempts = settings.retry.max_attempts,
        retry_delay_ms = settings.retry.delay.as_millis() as u64,
        submit_timeout_ms = timeouts.submit.as_millis() as u64,
        api_key_configured = settings.api_key.is_some(),
        auth_token_configured = settings.auth_token.is_some(),
        "upstream configured."
    );

    let transport = ReqwestTransport::new(timeouts).map_err(|e| {
        tracing::error!(error = %e, "failed to build http client");
        Error::other(e)
    })?;

    Ok(Arc::new(AppState {
        transport: Arc::new(transport),
        settings: Arc::new(settings),
    }))
}
