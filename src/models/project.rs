//! Project records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub budget: f64,
    pub department_id: Option<String>,
    pub project_manager_id: Option<String>,
    pub task_counts: Option<TaskCounts>,
    pub department: Option<DepartmentSummary>,
    pub project_manager: Option<ManagerSummary>,
}

/// Open/in-progress/closed task tallies embedded in project responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub open: u64,
    pub in_progress: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}
