use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::users::repo::User;

/// Inserts a session row for the user and returns its token.
pub async fn create_session(
    db: &PgPool,
    user_id: Uuid,
    ttl_minutes: i64,
) -> anyhow::Result<Uuid> {
    let token = Uuid::new_v4();
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(db)
        .await?;
    Ok(token)
}

/// Resolves a session token to its user. Expired sessions and deactivated
/// accounts do not resolve.
pub async fn find_user_by_token(db: &PgPool, token: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.password_hash, u.bio, u.birth_date,
               u.profile_picture, u.is_active, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > now() AND u.is_active
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Logout is idempotent: deleting a missing token is not an error.
pub async fn delete_session(db: &PgPool, token: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

pub fn session_cookie(config: &SessionConfig, token: Uuid) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        token,
        config.ttl_minutes * 60
    )
}

pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_name: "sessionid".into(),
            ttl_minutes: 2,
        }
    }

    #[test]
    fn cookie_carries_token_and_ttl() {
        let token = Uuid::new_v4();
        let cookie = session_cookie(&config(), token);
        assert!(cookie.starts_with(&format!("sessionid={token}")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=120"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&config());
        assert!(cookie.starts_with("sessionid=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
