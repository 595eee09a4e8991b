//! Employee endpoints

use serde_json::Value;

use crate::models::{Employee, Page, PageQuery};

use super::client::EmsClient;
use super::error::ApiError;

pub async fn query(client: &EmsClient, query: &PageQuery) -> Result<Page<Employee>, ApiError> {
    client.post_json("/employees", query).await
}

pub async fn get(client: &EmsClient, id: &str) -> Result<Employee, ApiError> {
    client.get_json(&format!("/employees/{id}")).await
}

pub async fn create(client: &EmsClient, body: &Value) -> Result<Employee, ApiError> {
    client.post_json("/employees/create", body).await
}

pub async fn update(client: &EmsClient, id: &str, body: &Value) -> Result<Employee, ApiError> {
    client.put_json(&format!("/employees/{id}"), body).await
}

pub async fn delete(client: &EmsClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/employees/{id}")).await
}

/// Typeahead search, also used to fill manager dropdowns. All
/// parameters are optional; `exclude_id` keeps an employee out of
/// their own manager candidates.
pub async fn search(
    client: &EmsClient,
    q: Option<&str>,
    department_id: Option<&str>,
    exclude_id: Option<&str>,
) -> Result<Vec<Employee>, ApiError> {
    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(q) = q {
        params.push(("q", q.to_string()));
    }
    if let Some(id) = department_id {
        params.push(("departmentId", id.to_string()));
    }
    if let Some(id) = exclude_id {
        params.push(("excludeId", id.to_string()));
    }
    client.get_json_with_query("/employees/search", &params).await
}
