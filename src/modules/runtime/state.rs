//! Shared runtime application state (HTTP handlers)

use std::sync::Arc;

use crate::router::QueryRouter;

/// Application state shared across handlers.
///
/// The router is read-only, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<QueryRouter>,
}

impl AppState {
    pub fn new(router: Arc<QueryRouter>) -> Self {
        Self { router }
    }
}
