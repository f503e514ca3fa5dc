use anyhow::Context;
use crm_web::{config, routes, telemetry, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = config::load().context("loading configuration")?;
    telemetry::init(&config.tracing).context("initialising tracing")?;
    let store = crm_db::create(&config.database)
        .await
        .context("creating database store")?;
    let app_state = AppState::new(Arc::new(store));
    let app = routes::setup(app_state);
    let listener = tokio::net::TcpListener::bind((config.bind_address.as_str(), config.bind_port))
        .await
        .context("binding listener")?;
    tracing::info!("listening on {}", listener.local_addr().context("reading local address")?);
    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown_signal(shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serving application")?;
    tracing::info!("server stopped, database pool released");
    Ok(())
}

async fn wait_for_shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Listening for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("Listening for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => (),
        _ = terminate => ()
    }
    tracing::info!("shutdown signal received");
    shutdown.cancel();
}
