//! Session lifecycle against the authentication API
//!
//! Owns login, refresh, logout, and the account-recovery endpoints,
//! and keeps the store plus the two broadcast streams (current user,
//! is-authenticated) consistent with server state.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use crate::api::error::{self, ApiError};
use crate::models::{AuthResponse, User, UserRole};

use super::hash::hash_password;
use super::store::SessionStore;
use super::tokens::{jwt_expiry, unix_now, Session, REFRESH_LEAD_SECS};

pub struct AuthService {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
    current_user: watch::Sender<Option<User>>,
    authenticated: watch::Sender<bool>,
}

impl AuthService {
    /// Seeds the broadcast state from whatever session is already
    /// stored: the cached profile, and whether a non-expired access
    /// token is present (decoded locally, not verified — the server
    /// remains the authority).
    pub fn new(base_url: impl Into<String>, store: Arc<SessionStore>) -> Self {
        let session = store.session();
        let (current_user, _) = watch::channel(session.as_ref().map(|s| s.user.clone()));
        let (authenticated, _) = watch::channel(session.as_ref().is_some_and(has_valid_token));
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
            current_user,
            authenticated,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    /// Proactive startup check: refresh eagerly when the access token
    /// is expired or inside the refresh lead, so the first real request
    /// does not pay a 401 round-trip. A failed refresh logs out.
    pub async fn initialize(&self) {
        let Some(session) = self.store.session() else {
            return;
        };
        let expiring = match jwt_expiry(&session.token) {
            Some(exp) => unix_now() + REFRESH_LEAD_SECS >= exp,
            // An undecodable token is as good as expired
            None => true,
        };
        if expiring {
            tracing::info!("Access token expired or expiring soon, refreshing");
            if let Err(e) = self.refresh_token().await {
                tracing::warn!("Startup token refresh failed: {e}");
            }
        }
    }

    /// Authenticate and install the returned session. The password is
    /// digested client-side; the username stays plaintext. On failure
    /// any prior session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let body = json!({
            "username": username,
            "password": hash_password(password),
        });
        let resp = self.post_auth("/auth/login", &body).await?;
        let auth: AuthResponse = decode(resp).await?;
        Ok(self.install(auth))
    }

    /// Exchange the stored refresh token for a new session. Fails fast
    /// with no network call when none is stored. Any failure is fatal
    /// to the session: the caller is logged out before the error
    /// propagates.
    pub async fn refresh_token(&self) -> Result<Session, ApiError> {
        let Some(refresh_token) = self.store.refresh_token() else {
            // Local fail-fast; the stale session still has to go, but
            // there is nothing to tell the server.
            self.clear_local();
            return Err(ApiError::NoRefreshToken);
        };

        let body = json!({ "refreshToken": refresh_token });
        match self.post_auth("/auth/refresh", &body).await {
            Ok(resp) => match decode::<AuthResponse>(resp).await {
                Ok(auth) => Ok(self.install(auth)),
                Err(e) => {
                    self.logout().await;
                    Err(e)
                }
            },
            Err(e) => {
                tracing::warn!("Token refresh failed: {e}");
                self.logout().await;
                Err(e)
            }
        }
    }

    /// Best-effort server notification, then unconditional local
    /// cleanup. Never fails from the caller's perspective.
    pub async fn logout(&self) {
        if let Some(token) = self.store.access_token() {
            let url = format!("{}/auth/logout", self.base_url);
            tracing::debug!("POST {}", url);
            match self.http.post(&url).bearer_auth(&token).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!("Logout endpoint returned {}", resp.status());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Logout call failed: {e}"),
            }
        }
        self.clear_local();
    }

    /// Redeem an activation token and set the initial password.
    pub async fn activate_account(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let body = json!({ "token": token, "password": hash_password(password) });
        self.post_auth("/auth/activate", &body).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let body = json!({ "email": email });
        self.post_auth("/auth/forgot-password", &body).await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let body = json!({ "token": token, "password": hash_password(password) });
        self.post_auth("/auth/reset-password", &body).await?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.current_user().is_some_and(|u| u.role == role)
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.current_user().is_some_and(|u| roles.contains(&u.role))
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    pub fn subscribe_authenticated(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// Persist a fresh session and re-emit broadcast state. The single
    /// writer of the store.
    fn install(&self, auth: AuthResponse) -> Session {
        let session = Session::from_response(auth);
        self.store.set(session.clone());
        self.current_user.send_replace(Some(session.user.clone()));
        self.authenticated.send_replace(true);
        session
    }

    fn clear_local(&self) {
        self.store.clear();
        self.current_user.send_replace(None);
        self.authenticated.send_replace(false);
    }

    async fn post_auth(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(error::transport)?;
        error::check_response(resp).await
    }
}

fn has_valid_token(session: &Session) -> bool {
    jwt_expiry(&session.token).is_some_and(|exp| unix_now() < exp)
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
}
