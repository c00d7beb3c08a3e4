use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<Date>,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, bio, birth_date, \
                            profile_picture, is_active, created_at";

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Login lookup: the identifier may be a username or an email.
pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
    ))
    .bind(identifier)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub birth_date: Option<Date>,
    pub profile_picture: Option<&'a str>,
}

pub async fn create(db: &PgPool, new: NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash, bio, birth_date, profile_picture) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.bio)
    .bind(new.birth_date)
    .bind(new.profile_picture)
    .fetch_one(db)
    .await
}

/// Partial profile update scoped to the owning user. The outer `Option` says
/// whether the field was supplied at all; an inner `None` clears the column.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    bio: Option<Option<&str>>,
    birth_date: Option<Option<Date>>,
    profile_picture: Option<Option<&str>>,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
             bio = CASE WHEN $2 THEN $3 ELSE bio END, \
             birth_date = CASE WHEN $4 THEN $5 ELSE birth_date END, \
             profile_picture = CASE WHEN $6 THEN $7 ELSE profile_picture END \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(bio.is_some())
    .bind(bio.flatten())
    .bind(birth_date.is_some())
    .bind(birth_date.flatten())
    .bind(profile_picture.is_some())
    .bind(profile_picture.flatten())
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// OAuth completion path: the provider has already verified the email. Reuses
/// an existing row or creates an active one with no password hash. Such
/// accounts cannot log in with a password.
pub async fn find_or_create_oauth_user(
    db: &PgPool,
    email: &str,
    username: &str,
) -> anyhow::Result<User> {
    if let Some(user) = find_by_email(db, email).await? {
        return Ok(user);
    }
    let user = create(
        db,
        NewUser {
            username,
            email,
            password_hash: None,
            bio: None,
            birth_date: None,
            profile_picture: None,
        },
    )
    .await?;
    Ok(user)
}
