use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Server-side binding of opaque session tokens to user ids. Shared
/// across requests through `AppState`; the cookie only ever carries the
/// token, never the identity itself.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, i64>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token bound to `user_id`.
    pub async fn start(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.write().await.insert(token.clone(), user_id);
        debug!(%user_id, "session started");
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<i64> {
        self.inner.read().await.get(token).copied()
    }

    /// Remove the binding. Returns whether a session existed; the caller
    /// decides whether ending nothing is an authorization failure.
    pub async fn end(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }
}

pub fn set_cookie(name: &str, token: &str) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of the `Cookie` header, if any. If the
/// header repeats the cookie name, the first occurrence wins.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == cookie_name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Extracts the raw session token without deciding whether its absence
/// is an error. Handlers that need their own 401 message use this.
pub struct CookieToken(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for CookieToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CookieToken(token_from_headers(
            &parts.headers,
            &state.config.session_cookie,
        )))
    }
}

/// Extracts and resolves the session, returning the authenticated user id.
pub struct SessionUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers, &state.config.session_cookie)
            .ok_or_else(|| ApiError::unauthorized("User is not logged in"))?;

        let user_id = state
            .sessions
            .resolve(&token)
            .await
            .ok_or_else(|| ApiError::unauthorized("User is not logged in"))?;

        Ok(SessionUser(user_id))
    }
}
