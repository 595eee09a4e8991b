//! Project endpoints

use serde_json::Value;

use crate::models::{Page, PageQuery, Project};

use super::client::EmsClient;
use super::error::ApiError;

pub async fn query(client: &EmsClient, query: &PageQuery) -> Result<Page<Project>, ApiError> {
    client.post_json("/projects", query).await
}

pub async fn get(client: &EmsClient, id: &str) -> Result<Project, ApiError> {
    client.get_json(&format!("/projects/{id}")).await
}

pub async fn create(client: &EmsClient, body: &Value) -> Result<Project, ApiError> {
    client.post_json("/projects/create", body).await
}

pub async fn update(client: &EmsClient, id: &str, body: &Value) -> Result<Project, ApiError> {
    client.put_json(&format!("/projects/{id}"), body).await
}

pub async fn delete(client: &EmsClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/projects/{id}")).await
}
