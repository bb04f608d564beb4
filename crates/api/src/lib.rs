//! Students API Server
//!
//! REST API over a single table of student records.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use data_validator::Validator;
use storage::StudentStore;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{AppConfig, ConfigError, HttpServerConfig, LogConfig};
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Student store
    pub store: Arc<dyn StudentStore>,
    /// Payload validator, built once at startup
    pub validator: Arc<Validator>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn StudentStore>, validator: Arc<Validator>) -> Self {
        Self {
            store,
            validator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::welcome))
        .route("/health", get(routes::health::health))
        .route(
            "/api/students",
            get(routes::students::list_students).post(routes::students::create_student),
        )
        .route(
            "/api/students/:id",
            get(routes::students::get_student)
                .put(routes::students::update_student)
                .delete(routes::students::delete_student),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.max_level()?)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Bind the configured address and serve until SIGINT or SIGTERM
pub async fn run_server(config: &HttpServerConfig, state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(&config.address).await?;
    serve(listener, state, shutdown_signal(), config.shutdown_grace()).await
}

/// Serve on `listener` until `shutdown` resolves
///
/// After shutdown the listener stops accepting and in-flight requests get
/// `grace` to finish before the server task is aborted.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let app = create_router(state);
    info!("Server started at {}", listener.local_addr()?);

    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { stopped.notified().await });
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut handle => return flatten(joined),
        () = shutdown => {}
    }

    info!("Shutting down the server");
    stop.notify_one();

    match tokio::time::timeout(grace, &mut handle).await {
        Ok(joined) => {
            flatten(joined)?;
            info!("Server shutdown successfully");
        }
        Err(_) => {
            warn!("In-flight requests still running after {:?}, aborting", grace);
            handle.abort();
        }
    }
    Ok(())
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    joined.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
