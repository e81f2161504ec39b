//! HTTP server for authgate

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use authgate_core::{AuthgateError, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::handlers::{HealthHandler, ItemsHandler, LoginHandler, UsersHandler};
use crate::router::QueryRouter;
use crate::state::AppState;

/// Runtime server for authgate
pub struct Runtime {
    settings: Arc<Settings>,
    router: Arc<QueryRouter>,
}

impl Runtime {
    /// Create a new runtime from settings
    pub fn new(settings: Settings) -> Self {
        Self::with_port_override(settings, None)
    }

    /// Create a new runtime with an optional port override
    pub fn with_port_override(mut settings: Settings, port_override: Option<u16>) -> Self {
        if let Some(port) = port_override {
            settings.server.port = port;
        }
        let router = Arc::new(QueryRouter::new(&settings.database));
        Self::with_router(settings, router)
    }

    /// Create a runtime around an existing query router
    pub fn with_router(settings: Settings, router: Arc<QueryRouter>) -> Self {
        Self {
            settings: Arc::new(settings),
            router,
        }
    }

    /// CORS layer for the configured origins
    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .settings
            .server
            .allowed_origins()
            .into_iter()
            .filter_map(|origin| match HeaderValue::from_str(&origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        // Credentials rule out wildcards, so methods and headers are mirrored
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        let state = AppState::new(self.router.clone());

        // Request timeout
        let timeout = TimeoutLayer::new(Duration::from_secs(30));

        Router::new()
            // Health check
            .route("/healthz", get(HealthHandler::check))
            // Users
            .route("/api/users", get(UsersHandler::list).post(UsersHandler::create))
            .route("/api/login", post(LoginHandler::login))
            // Replication smoke test
            .route("/test-items/", get(ItemsHandler::list).post(ItemsHandler::create))
            // State
            .with_state(state)
            // Middleware
            .layer(self.cors_layer())
            .layer(timeout)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    pub async fn run(&self) -> Result<(), AuthgateError> {
        let addr: SocketAddr = self
            .settings
            .server
            .bind_address()
            .parse()
            .map_err(|e| AuthgateError::Server(format!("Invalid address: {}", e)))?;

        let app = self.build_router();
        let db = &self.settings.database;

        info!("Starting authgate server on http://{}", addr);
        info!("Writes -> primary {}:{}", db.primary_host, db.port);
        info!("Reads  -> replica {}:{}", db.replica_host, db.port);
        info!("CORS origins: {}", self.settings.server.allowed_origins().join(", "));

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthgateError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .map_err(|e| AuthgateError::Server(format!("Server error: {}", e)))?;

        // Connections are per-operation, so there is nothing to drain
        info!("Server stopped");
        Ok(())
    }

    /// Wait for shutdown signal
    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                debug!("Received CTRL+C, shutting down...");
            }
            _ = terminate => {
                debug!("Received SIGTERM, shutting down...");
            }
        }
    }

    /// Get the settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the query router
    pub fn router(&self) -> &QueryRouter {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::app;
    use crate::router::testing::FakeConnector;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_runtime_with_port_override() {
        let runtime = Runtime::with_port_override(Settings::default(), Some(3000));
        assert_eq!(runtime.settings().server.port, 3000);
        assert_eq!(runtime.router().connector_type(), "postgres");
    }

    #[test]
    fn test_runtime_without_override() {
        let runtime = Runtime::new(Settings::default());
        assert_eq!(runtime.settings().server.port, 8000);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_frontend() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/login")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app(Arc::new(FakeConnector::empty()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/healthz")
            .header(header::ORIGIN, "http://evil.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app(Arc::new(FakeConnector::empty()))
            .oneshot(request)
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::builder()
            .uri("/query/get-users")
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::new(FakeConnector::empty()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
