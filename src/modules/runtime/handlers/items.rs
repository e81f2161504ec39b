//! Test item handlers, used to check replication end to end

use authgate_core::{AuthgateError, Row};
use authgate_types::api::{
    TestItemCreate, TestItemCreatedResponse, TestItemListResponse, TestItemRecord,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::json;

use super::{ApiResult, InputValidator};
use crate::state::AppState;

const INSERT_ITEM: &str = r#"
    INSERT INTO test_items (name, description)
    VALUES ($1, $2)
    RETURNING id, name, description, created_at
"#;

const LIST_ITEMS: &str = r#"
    SELECT id, name, description, created_at
    FROM test_items
    ORDER BY created_at DESC
"#;

/// Handler for the test item endpoints
pub struct ItemsHandler;

impl ItemsHandler {
    /// Handle POST /test-items/ (primary)
    pub async fn create(
        State(state): State<AppState>,
        payload: Result<Json<TestItemCreate>, JsonRejection>,
    ) -> ApiResult<TestItemCreatedResponse> {
        let Json(item) = payload?;
        InputValidator::new().validate_item(&item)?;

        let row = state
            .router
            .write_one(INSERT_ITEM, vec![json!(item.name), json!(item.description)])
            .await?
            .ok_or_else(|| AuthgateError::Internal("INSERT ... RETURNING produced no row".to_string()))?;

        Ok(Json(TestItemCreatedResponse {
            message: "Item created".to_string(),
            item: item_from_row(&row)?,
        }))
    }

    /// Handle GET /test-items/ (replica)
    pub async fn list(State(state): State<AppState>) -> ApiResult<TestItemListResponse> {
        let rows = state.router.read_all(LIST_ITEMS, vec![]).await?;
        let items = rows.iter().map(item_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Json(TestItemListResponse { items }))
    }
}

fn item_from_row(row: &Row) -> Result<TestItemRecord, AuthgateError> {
    Ok(TestItemRecord {
        id: row.get_i64("id")?,
        name: row.get_str("name")?.to_string(),
        description: row.get_opt_str("description")?.map(str::to_string),
        created_at: row.get_opt_str("created_at")?.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{app, send};
    use crate::router::testing::FakeConnector;
    use authgate_core::Outcome;
    use authgate_types::Role;
    use axum::http::StatusCode;
    use serde_json::Value;
    use std::sync::Arc;

    fn item_row(id: i64, description: Value) -> Row {
        Row::from_pairs([
            ("id", json!(id)),
            ("name", json!("widget")),
            ("description", description),
            ("created_at", json!("2024-05-01T10:00:00.123456")),
        ])
    }

    #[tokio::test]
    async fn test_create_item_on_primary() {
        let connector = Arc::new(FakeConnector::scripted(|op| {
            assert_eq!(op.params, vec![json!("widget"), Value::Null]);
            Ok(Outcome::Row(Some(item_row(1, Value::Null))))
        }));
        let (status, body) = send(
            app(connector.clone()),
            "POST",
            "/test-items/",
            Some(json!({"name": "widget"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item created");
        assert_eq!(body["item"]["description"], Value::Null);
        assert_eq!(body["item"]["created_at"], "2024-05-01T10:00:00.123456");
        assert_eq!(connector.calls()[0].0, Role::Primary);
    }

    #[tokio::test]
    async fn test_list_items_on_replica() {
        let connector = Arc::new(FakeConnector::scripted(|_| {
            Ok(Outcome::Rows(vec![item_row(2, json!("blue")), item_row(1, Value::Null)]))
        }));
        let (status, body) = send(app(connector.clone()), "GET", "/test-items/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["description"], "blue");
        assert_eq!(connector.calls()[0].0, Role::Replica);
    }

    #[tokio::test]
    async fn test_list_items_empty() {
        let (status, body) = send(app(Arc::new(FakeConnector::empty())), "GET", "/test-items/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"items": []}));
    }
}
