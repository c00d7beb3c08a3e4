use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavoriteStock {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stock_symbol: String,
    pub added_on: OffsetDateTime,
}

/// Every query here is filtered by the owning user; rows belonging to anyone
/// else are invisible through this module.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<FavoriteStock>> {
    let rows = sqlx::query_as::<_, FavoriteStock>(
        r#"
        SELECT id, user_id, stock_symbol, added_on
        FROM favorite_stocks
        WHERE user_id = $1
        ORDER BY added_on DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorite_stocks WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count.0)
}

/// No duplicate check: a user may hold the same symbol more than once.
pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    stock_symbol: &str,
) -> anyhow::Result<FavoriteStock> {
    let row = sqlx::query_as::<_, FavoriteStock>(
        r#"
        INSERT INTO favorite_stocks (user_id, stock_symbol)
        VALUES ($1, $2)
        RETURNING id, user_id, stock_symbol, added_on
        "#,
    )
    .bind(user_id)
    .bind(stock_symbol)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Deletes all of the user's rows for the symbol, returning how many matched.
/// Zero matches is not an error.
pub async fn delete_by_symbol(
    db: &PgPool,
    user_id: Uuid,
    stock_symbol: &str,
) -> anyhow::Result<u64> {
    let result =
        sqlx::query("DELETE FROM favorite_stocks WHERE user_id = $1 AND stock_symbol = $2")
            .bind(user_id)
            .bind(stock_symbol)
            .execute(db)
            .await?;
    Ok(result.rows_affected())
}
