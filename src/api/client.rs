//! Authenticated HTTP client for the EMS API
//!
//! Wraps reqwest::Client with bearer injection and the 401-refresh
//! protocol: the first failing request becomes the refresh leader,
//! concurrent failures queue behind it on a broadcast channel, and
//! everyone retries exactly once with the renewed token.

use std::sync::{Arc, Mutex};

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use crate::auth::service::AuthService;
use crate::auth::store::SessionStore;

use super::error::{self, ApiError};

/// Routes that never carry a bearer token and never enter the refresh
/// protocol; a 401 from these is a genuine credential failure.
const EXEMPT_PATHS: &[&str] = &[
    "/auth/login",
    "/auth/refresh",
    "/auth/activate",
    "/auth/forgot-password",
    "/auth/reset-password",
];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.iter().any(|p| path.starts_with(p))
}

/// Outcome broadcast to requests queued behind an in-flight refresh.
/// `Pending` is the "no token yet" sentinel; waiters must be able to
/// tell it apart from `Failed` or they would wait forever.
#[derive(Debug, Clone)]
enum RefreshSignal {
    Pending,
    Refreshed(String),
    Failed,
}

enum RefreshRole {
    Leader,
    Waiter(watch::Receiver<RefreshSignal>),
}

/// Single-flight gate around the refresh call. The flag flip and the
/// channel reset happen under one short lock that is never held across
/// an await, so at most one refresh call exists at any time.
struct RefreshGate {
    refreshing: Mutex<bool>,
    outcome: watch::Sender<RefreshSignal>,
}

impl RefreshGate {
    fn new() -> Self {
        let (outcome, _) = watch::channel(RefreshSignal::Pending);
        Self {
            refreshing: Mutex::new(false),
            outcome,
        }
    }

    /// The first caller in a refresh window becomes the leader and
    /// performs the network call; everyone else subscribes to the
    /// outcome. Subscription happens under the same lock that guards
    /// the flag, so a waiter can never miss the terminal broadcast.
    fn enter(&self) -> RefreshRole {
        let mut refreshing = self.refreshing.lock().expect("refresh gate poisoned");
        if *refreshing {
            RefreshRole::Waiter(self.outcome.subscribe())
        } else {
            *refreshing = true;
            self.outcome.send_replace(RefreshSignal::Pending);
            RefreshRole::Leader
        }
    }

    fn settle(&self, signal: RefreshSignal) {
        let mut refreshing = self.refreshing.lock().expect("refresh gate poisoned");
        *refreshing = false;
        self.outcome.send_replace(signal);
    }
}

pub struct EmsClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthService>,
    store: Arc<SessionStore>,
    gate: RefreshGate,
}

impl EmsClient {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: auth.base_url().to_string(),
            store: auth.store(),
            auth,
            gate: RefreshGate::new(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.request(Method::GET, path, &[], None::<&serde_json::Value>)
            .await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get(path).await?).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let resp = self
            .request(Method::GET, path, query, None::<&serde_json::Value>)
            .await?;
        decode(resp).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        decode(self.post(path, body).await?).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.request(Method::PUT, path, &[], Some(body)).await?;
        decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, &[], None::<&serde_json::Value>)
            .await?;
        Ok(())
    }

    /// Send one API request with the bearer attached, running the
    /// refresh protocol on a 401. A request is retried at most once:
    /// a second 401 with a fresh token propagates instead of looping.
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let exempt = is_exempt(path);
        let mut bearer = if exempt {
            None
        } else {
            self.store.access_token()
        };
        let mut retried = false;

        loop {
            let url = format!("{}{}", self.base_url, path);
            tracing::debug!("{} {}", method, url);

            let mut req = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(body) = body {
                req = req.json(body);
            }
            if let Some(token) = bearer.as_deref() {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await.map_err(error::transport)?;

            if resp.status() == StatusCode::UNAUTHORIZED && !exempt {
                if retried {
                    tracing::warn!("401 after token renewal for {}, giving up", path);
                    return Err(ApiError::SessionExpired);
                }
                bearer = Some(self.renewed_token().await?);
                retried = true;
                continue;
            }

            return error::check_response(resp).await;
        }
    }

    /// Obtain a renewed access token, either by leading the refresh or
    /// by waiting on the one already in flight. Every caller gets the
    /// same renewed token or an explicit rejection, never a stale token
    /// and never an indefinite wait.
    async fn renewed_token(&self) -> Result<String, ApiError> {
        match self.gate.enter() {
            RefreshRole::Leader => match self.auth.refresh_token().await {
                Ok(session) => {
                    self.gate.settle(RefreshSignal::Refreshed(session.token.clone()));
                    Ok(session.token)
                }
                Err(e) => {
                    // refresh_token has already forced the logout
                    tracing::warn!("Session renewal failed: {e}");
                    self.gate.settle(RefreshSignal::Failed);
                    Err(ApiError::SessionExpired)
                }
            },
            RefreshRole::Waiter(mut rx) => loop {
                if rx.changed().await.is_err() {
                    return Err(ApiError::SessionExpired);
                }
                let signal = rx.borrow_and_update().clone();
                match signal {
                    RefreshSignal::Pending => continue,
                    RefreshSignal::Refreshed(token) => return Ok(token),
                    RefreshSignal::Failed => return Err(ApiError::SessionExpired),
                }
            },
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
}
