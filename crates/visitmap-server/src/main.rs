mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use visitmap_geocode::NominatimClient;
use visitmap_route::{Resolver, ResolverConfig};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = visitmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = NominatimClient::new(
        &config.geocoder_url,
        &config.geocoder_user_agent,
        config.geocoder_timeout_secs,
    )?;
    let resolver = Resolver::new(Arc::new(client), ResolverConfig::from_app_config(&config));

    let auth = AuthState::from_config(
        config.api_keys.as_deref(),
        matches!(config.env, visitmap_core::Environment::Development),
    )?;
    let state = AppState::new(resolver, config.map_padding_px);
    let app = build_app(state, auth, default_rate_limit_state());

    tracing::info!(
        bind_addr = %config.bind_addr,
        env = %config.env,
        geocoder = %config.geocoder_url,
        "starting visitmap server"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
