// Server module
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::build::get_build_info;
use crate::core::config::ServerConfig;
use crate::core::state::AppState;
use crate::data::cache::FileTemplateCache;
use crate::data::registry::Registry;
use crate::services::culler::spawn_culler;
use crate::services::router::create_router;

/// Errors that may occur while binding or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop terminated with an IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Where to listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    /// Interface or host name to bind
    pub host: String,
    /// Port to bind; 0 picks an ephemeral port
    pub port: u16,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: crate::core::config::DEFAULT_HOST.to_string(),
            port: crate::core::config::DEFAULT_PORT,
        }
    }
}

impl From<&ServerConfig> for ServeOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Bind a listener for `options`.
pub async fn bind(options: &ServeOptions) -> Result<TcpListener, ServerError> {
    TcpListener::bind((options.host.as_str(), options.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: format!("{}:{}", options.host, options.port),
            source,
        })
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
///
/// Peer addresses are attached to every request so handlers can partition by
/// client address.
pub async fn serve_listener<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves when the process is asked to terminate.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::SignalKind;

        let mut term = install_signal(SignalKind::terminate(), "SIGTERM");
        let mut hup = install_signal(SignalKind::hangup(), "SIGHUP");
        let mut quit = install_signal(SignalKind::quit(), "SIGQUIT");

        let name = tokio::select! {
            _ = recv_signal(&mut term) => "SIGTERM",
            _ = recv_signal(&mut hup) => "SIGHUP",
            _ = recv_signal(&mut quit) => "SIGQUIT",
        };
        info!("Received {} - terminating", name);
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT - terminating"),
        _ = terminate => {},
    }
}

#[cfg(unix)]
fn install_signal(
    kind: tokio::signal::unix::SignalKind,
    name: &str,
) -> Option<tokio::signal::unix::Signal> {
    match tokio::signal::unix::signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("failed to install {} handler: {}", name, e);
            None
        }
    }
}

#[cfg(unix)]
async fn recv_signal(stream: &mut Option<tokio::signal::unix::Signal>) {
    match stream {
        Some(stream) => {
            stream.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Run the whole service described by `config` until a termination signal.
///
/// 1. Create the registry and template cache
/// 2. Bind the listen address
/// 3. Spawn the culler
/// 4. Serve the router with graceful shutdown
/// 5. Stop the culler
pub async fn run(config: ServerConfig) -> crate::Result<()> {
    run_until(config, shutdown_signal()).await
}

/// Same as [`run`] with a caller-provided shutdown future.
pub async fn run_until<F>(config: ServerConfig, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let build = get_build_info();
    info!(
        version = build.version,
        git = build.git_hash,
        built = build.build_time_utc,
        "starting lan-discovery"
    );

    let registry = Arc::new(Registry::new());
    let templates = Arc::new(FileTemplateCache::new(&config.static_root));
    let state = AppState::new(registry.clone(), templates).with_trust_proxy(config.trust_proxy);

    let listener = bind(&ServeOptions::from(&config)).await?;
    let local_addr = listener.local_addr().map_err(ServerError::Io)?;
    info!(
        addr = %local_addr,
        static_root = %config.static_root.display(),
        trust_proxy = config.trust_proxy,
        "server listening"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let culler = spawn_culler(registry, config.cull_interval(), config.max_age(), stop_rx);
    let app = create_router(state, &config.assets_dir());

    let served = serve_listener(listener, app, shutdown).await;

    // fails only if the culler already exited
    let _ = stop_tx.send(true);
    culler.await.map_err(|e| ServerError::Task(e.to_string()))?;

    served?;
    info!("server stopped");
    Ok(())
}
