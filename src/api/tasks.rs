//! Task endpoints
//!
//! Tasks are the one resource listed via GET query parameters rather
//! than a POST query body.

use serde_json::Value;

use crate::models::{Page, PageQuery, Task};

use super::client::EmsClient;
use super::error::ApiError;

pub async fn query(client: &EmsClient, query: &PageQuery) -> Result<Page<Task>, ApiError> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("size", query.size.to_string()),
        ("sortDir", query.sort_dir.clone()),
    ];
    if let Some(sort_by) = &query.sort_by {
        params.push(("sortBy", sort_by.clone()));
    }
    client.get_json_with_query("/tasks", &params).await
}

pub async fn get(client: &EmsClient, id: &str) -> Result<Task, ApiError> {
    client.get_json(&format!("/tasks/{id}")).await
}

pub async fn create(client: &EmsClient, body: &Value) -> Result<Task, ApiError> {
    client.post_json("/tasks", body).await
}

pub async fn update(client: &EmsClient, id: &str, body: &Value) -> Result<Task, ApiError> {
    client.put_json(&format!("/tasks/{id}"), body).await
}

pub async fn delete(client: &EmsClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/tasks/{id}")).await
}
