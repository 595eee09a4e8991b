//! Office location records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: Option<String>,
}
