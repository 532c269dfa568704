//! Application startup and lifecycle management.

use crate::config::ExplorerConfig;
use crate::handlers::{assistant, health, metrics::metrics_handler, not_found, proxy};
use crate::services::providers::anthropic::AnthropicProvider;
use crate::services::providers::CompletionProvider;
use crate::services::HttpForwarder;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::{allow_any_origin, preflight},
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// Built once at startup; handlers never consult the environment.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ExplorerConfig>,
    pub forwarder: HttpForwarder,
    /// `None` when no model credential is configured.
    pub assistant: Option<Arc<dyn CompletionProvider>>,
}

impl AppState {
    pub fn from_config(config: ExplorerConfig) -> Result<Self, AppError> {
        let forwarder = HttpForwarder::new(&config.proxy).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to build proxy HTTP client: {}", e))
        })?;

        let assistant = match config.assistant.credential() {
            Some(api_key) => {
                let provider = AnthropicProvider::new(&config.assistant, api_key.clone())
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "Failed to build Anthropic HTTP client: {}",
                            e
                        ))
                    })?;
                tracing::info!(model = %config.assistant.model, "Initialized Anthropic provider");
                Some(Arc::new(provider) as Arc<dyn CompletionProvider>)
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY not set; /api/ai will answer 503");
                None
            }
        };

        Ok(Self {
            config: Arc::new(config),
            forwarder,
            assistant,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/proxy", post(proxy::forward).options(preflight))
        .route("/api/ai", post(assistant::suggest).options(preflight))
        .route("/metrics", get(metrics_handler));

    let router = match &state.config.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .append_index_html_on_directories(true)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(not_found.into_service()),
        ),
        None => router.fallback(not_found),
    };

    // Proxied payloads carry arbitrary request bodies; no framework cap.
    router
        .layer(DefaultBodyLimit::disable())
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(allow_any_origin())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ExplorerConfig) -> Result<Self, AppError> {
        let address = config.common.address();
        let state = AppState::from_config(config)?;
        Self::with_state(&address, state).await
    }

    /// Bind `address` (port 0 = random port for testing) and serve `state`.
    pub async fn with_state(address: &str, state: AppState) -> Result<Self, AppError> {
        let listener = TcpListener::bind(address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            service = %state.config.service_name,
            "HTTP server listening on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
