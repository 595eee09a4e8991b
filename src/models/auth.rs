//! Authentication wire types and user roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried in every user profile; the server enforces it, the
/// client only consults it for early feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SystemAdmin,
    HrManager,
    DepartmentManager,
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SystemAdmin => "SYSTEM_ADMIN",
            UserRole::HrManager => "HR_MANAGER",
            UserRole::DepartmentManager => "DEPARTMENT_MANAGER",
            UserRole::Employee => "EMPLOYEE",
        }
    }

    pub fn all() -> [UserRole; 4] {
        [
            UserRole::SystemAdmin,
            UserRole::HrManager,
            UserRole::DepartmentManager,
            UserRole::Employee,
        ]
    }

    /// Roles a SYSTEM_ADMIN may provision through `/auth/register`.
    /// Employee accounts are created via the activation-email flow instead.
    pub fn admin_creatable() -> [UserRole; 2] {
        [UserRole::SystemAdmin, UserRole::HrManager]
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SYSTEM_ADMIN" => Ok(UserRole::SystemAdmin),
            "HR_MANAGER" => Ok(UserRole::HrManager),
            "DEPARTMENT_MANAGER" => Ok(UserRole::DepartmentManager),
            "EMPLOYEE" => Ok(UserRole::Employee),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Cached user profile; an immutable snapshot replaced only by a
/// login or refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub employee_id: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
}

/// Response body of `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Response body of `/auth/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        for role in UserRole::all() {
            let s = serde_json::to_string(&role).unwrap();
            assert_eq!(s, format!("\"{}\"", role.as_str()));
            let back: UserRole = serde_json::from_str(&s).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn role_parses_loosely() {
        assert_eq!("hr-manager".parse::<UserRole>().unwrap(), UserRole::HrManager);
        assert_eq!(
            "SYSTEM_ADMIN".parse::<UserRole>().unwrap(),
            UserRole::SystemAdmin
        );
        assert!("wizard".parse::<UserRole>().is_err());
    }

    #[test]
    fn user_deserializes_with_null_links() {
        let user: User = serde_json::from_str(
            r#"{"id":"u-1","username":"ada","email":"ada@example.com",
                "role":"EMPLOYEE","employeeId":null,
                "createdAt":"2024-01-01T00:00:00","lastLogin":null}"#,
        )
        .unwrap();
        assert_eq!(user.role, UserRole::Employee);
        assert!(user.employee_id.is_none());
        assert!(user.last_login.is_none());
    }
}
