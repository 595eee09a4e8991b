//! Project task records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_date: String,
    pub due_date: Option<String>,
    pub completed_date: Option<String>,
    pub project_id: String,
    pub assigned_to_id: Option<String>,
}
