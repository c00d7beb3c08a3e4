use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{LoginRequest, MessageResponse};
use super::extractors::cookie_value;
use super::password::verify_password;
use super::session;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::users::repo::{self, User};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login/", post(login))
        .route("/logout/", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<([(header::HeaderName, String); 1], Json<MessageResponse>), ApiError> {
    let user = repo::find_by_identifier(&state.db, payload.username.trim()).await?;

    // A miss, a wrong password, an inactive account and a password-less OAuth
    // account all produce the same response: never reveal which it was.
    let user = match user {
        Some(u) => u,
        None => {
            warn!("login with unknown identifier");
            return Err(ApiError::InvalidCredentials);
        }
    };
    if !user.is_active {
        warn!(user_id = %user.id, "login attempt on inactive account");
        return Err(ApiError::InvalidCredentials);
    }
    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "password login attempt on oauth-only account");
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(&payload.password, hash).unwrap_or(false) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token =
        session::create_session(&state.db, user.id, state.config.session.ttl_minutes).await?;
    info!(user_id = %user.id, "user logged in");

    Ok((
        [(
            header::SET_COOKIE,
            session::session_cookie(&state.config.session, token),
        )],
        Json(MessageResponse::new("Login successful")),
    ))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<([(header::HeaderName, String); 1], Json<MessageResponse>), ApiError> {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| cookie_value(h, &state.config.session.cookie_name))
        .and_then(|v| Uuid::parse_str(v).ok())
    {
        session::delete_session(&state.db, token).await?;
        info!("session invalidated");
    }

    Ok((
        [(
            header::SET_COOKIE,
            session::clear_session_cookie(&state.config.session),
        )],
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// OAuth completion: the provider callback layer hands over a verified email
/// and a preferred username; this creates the account if absent and opens a
/// session, mirroring a password login from here on.
pub async fn complete_oauth_login(
    db: &PgPool,
    config: &SessionConfig,
    email: &str,
    username: &str,
) -> anyhow::Result<(User, Uuid)> {
    let user = repo::find_or_create_oauth_user(db, email, username).await?;
    let token = session::create_session(db, user.id, config.ttl_minutes).await?;
    info!(user_id = %user.id, "oauth login completed");
    Ok((user, token))
}
