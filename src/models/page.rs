//! Pagination envelope shared by every list endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Paginated query request: `{page, size, sortBy?, sortDir}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub sort_dir: String,
}

impl PageQuery {
    /// Blank sort fields are dropped so they never reach the wire.
    pub fn new(page: u32, size: u32, sort_by: Option<String>, sort_dir: String) -> Self {
        let sort_by = sort_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            page,
            size,
            sort_by,
            sort_dir,
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(0, 20, None, "ASC".to_string())
    }
}

/// One option in a server-provided table filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    pub value: Option<String>,
}

/// Server page response wrapping `content` with paging metadata and
/// optional reusable filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
    pub filters: Option<HashMap<String, Vec<FilterOption>>>,
}
