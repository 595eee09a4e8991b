//! Department records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub created_at: Option<String>,
    pub budget: f64,
    pub budget_utilization: Option<f64>,
    pub performance_metric: Option<f64>,
    pub department_head_id: Option<String>,
    pub department_head_name: Option<String>,
}
