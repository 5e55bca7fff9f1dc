//! HTTP entrypoints for the rekognizer service

pub mod error;
mod handlers;

pub use handlers::{ImageRequest, VerifyRequest};

use crate::config::toml_config::CorsConfig;
use crate::core::RekognizerService;
use crate::utils::error::{RekognizerError, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RekognizerService>,
}

impl AppState {
    pub fn new(service: Arc<RekognizerService>) -> Self {
        Self { service }
    }
}

/// Every route answers `OPTIONS` preflights; allowed request headers are
/// echoed back from `Access-Control-Request-Headers`.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| RekognizerError::InvalidConfigValueError {
                    field: "cors.allowed_origins".to_string(),
                    value: o.clone(),
                    reason: "Not a valid header value".to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if config.allowed_methods.iter().any(|m| m == "*") {
        AllowMethods::any()
    } else {
        let methods = config
            .allowed_methods
            .iter()
            .map(|m| {
                m.parse::<Method>()
                    .map_err(|_| RekognizerError::InvalidConfigValueError {
                        field: "cors.allowed_methods".to_string(),
                        value: m.clone(),
                        reason: "Not an HTTP method".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        AllowMethods::list(methods)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Create the main API application
pub fn create_app(service: Arc<RekognizerService>, cors: &CorsConfig) -> Result<Router> {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/hello/:name", get(handlers::hello))
        .route("/verify", post(handlers::verify))
        .route("/recognize", post(handlers::recognize))
        .route(
            "/users/:user_id/faces",
            get(handlers::list_faces)
                .post(handlers::enroll)
                .delete(handlers::forget),
        )
        .with_state(AppState::new(service))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors)?),
        );

    Ok(app)
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(app: Router, bind_address: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("🚀 API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
