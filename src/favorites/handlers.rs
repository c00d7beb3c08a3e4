use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    CreateFavoriteRequest, FavoriteListResponse, FavoriteStockResponse, Pagination,
};
use super::repo;
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorite-stocks/", get(list_favorites))
        .route("/favorite-stocks/create/", post(create_favorite))
        .route("/favorite-stocks/delete/:stock_symbol/", delete(delete_favorite))
}

#[instrument(skip(state, user, pagination))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<FavoriteListResponse>, ApiError> {
    let count = repo::count_for_user(&state.db, user.id).await?;
    let rows = repo::list_for_user(
        &state.db,
        user.id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    Ok(Json(FavoriteListResponse {
        count,
        results: rows.into_iter().map(FavoriteStockResponse::from).collect(),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteStockResponse>), ApiError> {
    payload.validate()?;
    let row = repo::insert(&state.db, user.id, &payload.stock_symbol).await?;
    info!(user_id = %user.id, symbol = %row.stock_symbol, "favorite created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Symbol-keyed delete: removes every matching row owned by the caller and
/// succeeds with 204 even when nothing matched.
#[instrument(skip(state, user))]
pub async fn delete_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(stock_symbol): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete_by_symbol(&state.db, user.id, &stock_symbol).await?;
    info!(user_id = %user.id, symbol = %stock_symbol, deleted, "favorite delete");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::users::repo::{create as create_user, NewUser, User};

    async fn seed_user(db: &PgPool, username: &str, email: &str) -> User {
        create_user(
            db,
            NewUser {
                username,
                email,
                password_hash: Some("x"),
                bio: None,
                birth_date: None,
                profile_picture: None,
            },
        )
        .await
        .expect("seed user")
    }

    fn first_page() -> Pagination {
        Pagination {
            page: 1,
            page_size: 10,
        }
    }

    #[sqlx::test]
    async fn create_stores_the_caller_as_owner(pool: PgPool) {
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let state = AppState::fake_with_db(pool);

        let (status, Json(created)) = create_favorite(
            State(state),
            AuthUser(alice.clone()),
            AppJson(CreateFavoriteRequest {
                stock_symbol: "AAPL".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.user, alice.id);
        assert_eq!(created.stock_symbol, "AAPL");
    }

    #[sqlx::test]
    async fn list_excludes_other_users_rows(pool: PgPool) {
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let bob = seed_user(&pool, "bob", "bob@example.com").await;
        let state = AppState::fake_with_db(pool);

        create_favorite(
            State(state.clone()),
            AuthUser(alice.clone()),
            AppJson(CreateFavoriteRequest {
                stock_symbol: "AAPL".into(),
            }),
        )
        .await
        .unwrap();

        let Json(bob_list) =
            list_favorites(State(state.clone()), AuthUser(bob), AppQuery(first_page()))
                .await
                .unwrap();
        assert_eq!(bob_list.count, 0);
        assert!(bob_list.results.is_empty());

        let Json(alice_list) =
            list_favorites(State(state), AuthUser(alice), AppQuery(first_page()))
                .await
                .unwrap();
        assert_eq!(alice_list.count, 1);
        assert_eq!(alice_list.results[0].stock_symbol, "AAPL");
    }

    #[sqlx::test]
    async fn delete_never_touches_other_users_rows(pool: PgPool) {
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let bob = seed_user(&pool, "bob", "bob@example.com").await;
        let state = AppState::fake_with_db(pool);

        create_favorite(
            State(state.clone()),
            AuthUser(alice.clone()),
            AppJson(CreateFavoriteRequest {
                stock_symbol: "AAPL".into(),
            }),
        )
        .await
        .unwrap();

        // Symbol matches, owner does not: 204 with nothing removed.
        let status = delete_favorite(
            State(state.clone()),
            AuthUser(bob),
            Path("AAPL".into()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(alice_list) =
            list_favorites(State(state), AuthUser(alice), AppQuery(first_page()))
                .await
                .unwrap();
        assert_eq!(alice_list.count, 1);
    }
}
