//! Employee records

use serde::{Deserialize, Serialize};

/// Employee as returned by the server. Names of related records
/// (department, manager, location) arrive denormalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub designation: String,
    pub salary: f64,
    pub joining_date: String,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub performance_rating: Option<f64>,
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub department_id: Option<String>,
    pub department_name: Option<String>,
    pub work_location: Option<String>,
    pub experience_years: Option<f64>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
