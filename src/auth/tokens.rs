//! Session credentials and JWT expiry inspection

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{AuthResponse, User};

/// Refresh eagerly when the access token has less than this long to live.
pub const REFRESH_LEAD_SECS: u64 = 300;

/// The authenticated credential bundle held by a logged-in client.
/// Replaced wholesale on refresh, destroyed on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub refresh_token: String,
    /// Unix seconds, derived from the server's `expiresIn` at receipt.
    pub expires_at: Option<u64>,
    pub user: User,
}

impl Session {
    pub fn from_response(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            refresh_token: resp.refresh_token,
            user: resp.user,
            expires_at: Some(unix_now() + resp.expires_in),
        }
    }

    /// True when the access token is past, or within the refresh lead
    /// of, its expiry. Prefers the JWT `exp` claim over the stored
    /// timestamp.
    pub fn is_expiring(&self) -> bool {
        match jwt_expiry(&self.token).or(self.expires_at) {
            Some(exp) => unix_now() + REFRESH_LEAD_SECS >= exp,
            None => false,
        }
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Decode the `exp` claim of a JWT without verifying the signature.
/// The server is the authority on validity; this only schedules
/// client-side refreshes.
pub fn jwt_expiry(token: &str) -> Option<u64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_u64()
}
