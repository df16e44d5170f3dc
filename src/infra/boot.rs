use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::clients::shell::{CommandExecutor, ShellExecutor};
use crate::core::dispatch::Dispatcher;
use crate::infra::config::{Config, Mode};
use crate::infra::mcp::JetsonSvc;

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;
    tracing::info!(
        mode = %cfg.mode,
        host = %cfg.host,
        port = cfg.port,
        "BOOT jetson-mcp-server"
    );

    let identity = cfg.identity();
    let exec: Arc<dyn CommandExecutor> = Arc::new(ShellExecutor::default());
    let registry = crate::tools::build_registry(exec, identity.clone())?;
    tracing::info!(?registry, "registry built");
    let dispatcher = Dispatcher::new(registry);

    if cfg.mode == Mode::Stdio {
        return crate::infra::mcp::serve_stdio(JetsonSvc::new(dispatcher, identity)).await;
    }

    let app = crate::infra::http_app::build_app(dispatcher, identity);
    let listener = TcpListener::bind(cfg.addr()?).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    serve(listener, app, shutdown_signal(), cfg.shutdown_grace()).await
}

/// Serve until `shutdown` resolves, then drain. Streams still open after
/// `grace` (long-lived SSE sessions) are dropped.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
    grace: Duration,
) -> anyhow::Result<()> {
    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let graceful = async move {
        shutdown.await;
        tracing::info!("shutdown requested, draining connections");
        let _ = stop_tx.send(true);
    };
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();
    let deadline = async move {
        let requested = stop_rx.wait_for(|stopped| *stopped).await.is_ok();
        if !requested {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        res = server => res?,
        _ = deadline => tracing::warn!(?grace, "drain timed out, closing remaining connections"),
    }
    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
