//! Error taxonomy for the EMS API surface

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad login, or a 401 from an endpoint that never carries a
    /// bearer token. Surfaced verbatim, never triggers a refresh.
    #[error("invalid credentials: {0}")]
    Credential(String),

    /// Refresh failed or was impossible; the local session has already
    /// been cleared by the time this is observed.
    #[error("session expired; run 'ems-cli login' to sign in again")]
    SessionExpired,

    /// The server could not be reached at all.
    #[error("cannot connect to the server: {0}")]
    Transport(String),

    /// 4xx with field-level detail from the server's validation layer.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field_errors: Vec<FieldError>,
    },

    /// Local fail-fast when a refresh is requested with nothing stored.
    #[error("no refresh token stored")]
    NoRefreshToken,

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("malformed server response: {0}")]
    Decode(String),
}

/// One field-level failure reported by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: Option<String>,
    pub rejected_value: Option<serde_json::Value>,
}

/// Error body shape shared by all server error responses:
/// `{status, error, message, path, fieldErrors}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field_errors: Vec<FieldError>,
}

pub(crate) fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Map a non-success response onto the taxonomy. 401 maps to a
/// credential error; callers that already run the refresh protocol
/// never hand a protected 401 to this function.
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let code = status.as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| status.to_string());

    Err(match code {
        401 => ApiError::Credential(message),
        400 | 409 | 422 if !body.field_errors.is_empty() => ApiError::Validation {
            message,
            field_errors: body.field_errors,
        },
        _ => ApiError::Server {
            status: code,
            message,
        },
    })
}
