//! Location endpoints

use serde_json::Value;

use crate::models::{Location, Page, PageQuery};

use super::client::EmsClient;
use super::error::ApiError;

pub async fn query(client: &EmsClient, query: &PageQuery) -> Result<Page<Location>, ApiError> {
    client.post_json("/locations", query).await
}

pub async fn get(client: &EmsClient, id: &str) -> Result<Location, ApiError> {
    client.get_json(&format!("/locations/{id}")).await
}

pub async fn create(client: &EmsClient, body: &Value) -> Result<Location, ApiError> {
    client.post_json("/locations/create", body).await
}

pub async fn update(client: &EmsClient, id: &str, body: &Value) -> Result<Location, ApiError> {
    client.put_json(&format!("/locations/{id}"), body).await
}

pub async fn delete(client: &EmsClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/locations/{id}")).await
}
