//! Health check handler

use authgate_types::api::{ComponentStatus, HealthResponse};
use axum::{extract::State, Json};
use tracing::warn;

use crate::state::AppState;

/// Handler for the health endpoint
pub struct HealthHandler;

impl HealthHandler {
    /// Handle GET /healthz
    ///
    /// Always answers 200; a failing replica only degrades the status.
    pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
        let replica = match state.router.read_one("SELECT 1", vec![]).await {
            Ok(_) => ComponentStatus::Ok,
            Err(e) => {
                warn!("Replica health check failed: {}", e);
                ComponentStatus::Error
            }
        };
        Json(HealthResponse::from_replica(replica))
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{app, send};
    use crate::router::testing::FakeConnector;
    use authgate_types::Role;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_ok() {
        let connector = Arc::new(FakeConnector::empty());
        let (status, body) = send(app(connector.clone()), "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "ok", "services": {"database_read_replica": "ok"}})
        );
        assert_eq!(connector.calls(), vec![(Role::Replica, "SELECT 1".to_string())]);
    }

    #[tokio::test]
    async fn test_health_degraded_when_replica_down() {
        let connector = Arc::new(FakeConnector::empty().with_down(Role::Replica));
        let (status, body) = send(app(connector.clone()), "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["services"]["database_read_replica"], "error");
        assert!(connector.calls_by_role().get(&Role::Primary).is_none());
    }
}
