use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use super::repo::{self, NewUser};
use crate::auth::extractors::AuthUser;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/", get(current_user))
        .route("/user/create/", post(create_user))
        .route("/user/edit/", patch(edit_user))
}

/// Returns the caller's own record; an unresolved identity is a denial.
#[instrument(skip(user))]
pub async fn current_user(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_string();
    payload.username = payload.username.trim().to_string();
    payload.validate()?;

    // Friendlier message than the raw constraint violation; the unique index
    // still backs this up under concurrent registration.
    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        return Err(ApiError::Validation("Email already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(
        &state.db,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: Some(&hash),
            bio: payload.bio.as_deref(),
            birth_date: payload.birth_date,
            profile_picture: payload.profile_picture.as_deref(),
        },
    )
    .await?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Partial update of the caller's own profile. Only bio, birth date and
/// profile picture are editable.
#[instrument(skip(state, user, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;
    let updated = repo::update_profile(
        &state.db,
        user.id,
        payload.bio.as_ref().map(|b| b.as_deref()),
        payload.birth_date,
        payload.profile_picture.as_ref().map(|p| p.as_deref()),
    )
    .await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(updated.into()))
}
