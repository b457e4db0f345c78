use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest},
        password::{hash_password, verify_password},
        repo::User,
        session::{clear_cookie, set_cookie, CookieToken},
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/check_session", get(check_session))
        .route("/login", post(login))
        .route("/logout", delete(logout))
}

fn session_headers(state: &AppState, token: &str) -> Result<HeaderMap, ApiError> {
    let value = set_cookie(&state.config.session_cookie, token)
        .parse::<HeaderValue>()
        .map_err(anyhow::Error::from)?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<PublicUser>), ApiError> {
    let hash = hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        &payload.username,
        &hash,
        Some(&payload.bio),
        Some(&payload.image_url),
    )
    .await
    .map_err(|e| {
        warn!(username = %payload.username, error = %e, "signup rejected");
        e
    })?;

    // The insert RETURNING clause should always hand back an id.
    if user.id <= 0 {
        warn!(username = %payload.username, "created user has no id");
        return Err(ApiError::BadRequest);
    }

    let token = state.sessions.start(user.id).await;
    let headers = session_headers(&state, &token)?;

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, headers, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), ApiError> {
    // Unknown username and wrong password answer identically so the
    // response does not leak which usernames exist.
    let user = match User::find_by_username(&state.db, &payload.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = state.sessions.start(user.id).await;
    let headers = session_headers(&state, &token)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((headers, Json(user.into())))
}

#[instrument(skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    CookieToken(token): CookieToken,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    // Logging out without a live session is an authorization failure,
    // not a silent success.
    let Some(token) = token else {
        return Err(ApiError::unauthorized("Log in"));
    };
    if !state.sessions.end(&token).await {
        return Err(ApiError::unauthorized("Log in"));
    }

    let value = clear_cookie(&state.config.session_cookie)
        .parse::<HeaderValue>()
        .map_err(anyhow::Error::from)?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);

    info!("session ended");
    Ok((StatusCode::NO_CONTENT, headers))
}

#[instrument(skip(state, token))]
pub async fn check_session(
    State(state): State<AppState>,
    CookieToken(token): CookieToken,
) -> Result<Json<PublicUser>, ApiError> {
    let user_id = match token {
        Some(ref t) => state.sessions.resolve(t).await,
        None => None,
    };

    // A session pointing at a vanished user counts as not logged in.
    if let Some(user_id) = user_id {
        if let Some(user) = User::find_by_id(&state.db, user_id).await? {
            return Ok(Json(user.into()));
        }
        warn!(user_id, "session resolves to missing user");
    }

    Err(ApiError::unauthorized("User not logged in"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unauthorized(err: ApiError, expected: &str) {
        match err {
            ApiError::Unauthorized(msg) => assert_eq!(msg, expected),
            other => panic!("expected Unauthorized, got {other}"),
        }
    }

    #[tokio::test]
    async fn logout_without_cookie_is_unauthorized() {
        let state = AppState::fake();
        let err = logout(State(state), CookieToken(None))
            .await
            .unwrap_err();
        assert_unauthorized(err, "Log in");
    }

    #[tokio::test]
    async fn logout_ends_session_and_clears_cookie() {
        let state = AppState::fake();
        let token = state.sessions.start(5).await;

        let (status, headers) = logout(State(state.clone()), CookieToken(Some(token.clone())))
            .await
            .expect("logout with live session");

        assert_eq!(status, StatusCode::NO_CONTENT);
        let cookie = headers
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("cookie cleared");
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(state.sessions.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn second_logout_is_unauthorized() {
        let state = AppState::fake();
        let token = state.sessions.start(5).await;
        logout(State(state.clone()), CookieToken(Some(token.clone())))
            .await
            .expect("first logout");

        let err = logout(State(state), CookieToken(Some(token)))
            .await
            .unwrap_err();
        assert_unauthorized(err, "Log in");
    }

    #[tokio::test]
    async fn check_session_without_cookie_is_unauthorized() {
        let state = AppState::fake();
        let err = check_session(State(state), CookieToken(None))
            .await
            .unwrap_err();
        assert_unauthorized(err, "User not logged in");
    }

    #[tokio::test]
    async fn check_session_with_stale_token_is_unauthorized() {
        let state = AppState::fake();
        let token = state.sessions.start(8).await;
        state.sessions.end(&token).await;

        let err = check_session(State(state), CookieToken(Some(token)))
            .await
            .unwrap_err();
        assert_unauthorized(err, "User not logged in");
    }
}
