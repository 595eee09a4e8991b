//! Department endpoints

use serde_json::Value;

use crate::models::{Department, Page, PageQuery};

use super::client::EmsClient;
use super::error::ApiError;

pub async fn query(client: &EmsClient, query: &PageQuery) -> Result<Page<Department>, ApiError> {
    client.post_json("/departments", query).await
}

pub async fn get(client: &EmsClient, id: &str) -> Result<Department, ApiError> {
    client.get_json(&format!("/departments/{id}")).await
}

pub async fn create(client: &EmsClient, body: &Value) -> Result<Department, ApiError> {
    client.post_json("/departments/create", body).await
}

pub async fn update(client: &EmsClient, id: &str, body: &Value) -> Result<Department, ApiError> {
    client.put_json(&format!("/departments/{id}"), body).await
}

pub async fn delete(client: &EmsClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/departments/{id}")).await
}
