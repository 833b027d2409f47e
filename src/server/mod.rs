//! HTTP server for inference
//!
//! One prediction endpoint plus health and model metadata.

mod extract;
mod handlers;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::engine::Classifier;

pub use extract::ImageUpload;
pub use handlers::AppState;
pub use routes::api_routes;

/// Build the application router with the configured middleware
pub fn router(classifier: Arc<Classifier>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState::new(classifier));

    let mut app = Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

    if config.cors.enabled {
        app = app.layer(cors_layer(&config.cors.origins));
    }
    if config.request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    let origin = if allowed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the HTTP inference server
pub async fn start(classifier: Arc<Classifier>, config: ServerConfig) -> Result<()> {
    let app = router(Arc::clone(&classifier), &config);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  GET  /v1/models - Served model");
    tracing::info!("  POST /predict - Classify an image");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(classifier))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(classifier: Arc<Classifier>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    classifier.close();
}
