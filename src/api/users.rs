//! User provisioning
//!
//! `/auth/register` is admin-only and, unlike the other auth routes,
//! goes through the normal bearer pipeline.

use crate::auth::hash::hash_password;
use crate::models::{RegisterResponse, User, UserRole};

use super::client::EmsClient;
use super::error::ApiError;

/// Create a user account. The new account does not replace the
/// caller's session; the admin stays logged in.
pub async fn register(
    client: &EmsClient,
    username: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<User, ApiError> {
    let body = serde_json::json!({
        "username": username,
        "email": email,
        "password": hash_password(password),
        "role": role,
    });
    let resp: RegisterResponse = client.post_json("/auth/register", &body).await?;
    Ok(resp.user)
}
