use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo::User;
use crate::error::ApiError;

pub const MAX_BIO_CHARS: usize = 500;
pub const MIN_PASSWORD_CHARS: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Dates cross the API as `YYYY/MM/DD` strings.
pub mod birth_date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn format(date: Date) -> String {
        date.format(format_description!("[year]/[month]/[day]"))
            .unwrap_or_default()
    }

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&format(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => Date::parse(&s, format_description!("[year]/[month]/[day]"))
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    #[serde(default, with = "birth_date_format")]
    pub birth_date: Option<Date>,
    pub profile_picture: Option<String>,
}

/// Partial-update semantics: an absent field leaves the stored value
/// unchanged, an explicit JSON `null` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_birth_date")]
    pub birth_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture: Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn double_birth_date<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    birth_date_format::deserialize(deserializer).map(Some)
}

/// Public part of the user returned to the client. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    #[serde(with = "birth_date_format")]
    pub birth_date: Option<Date>,
    pub profile_picture: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            bio: u.bio,
            birth_date: u.birth_date,
            profile_picture: u.profile_picture,
        }
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Validation("Username is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ApiError::Validation("Password too short".into()));
        }
        validate_bio(self.bio.as_deref())
    }
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_bio(self.bio.as_ref().and_then(|b| b.as_deref()))
    }
}

fn validate_bio(bio: Option<&str>) -> Result<(), ApiError> {
    match bio {
        Some(b) if b.chars().count() > MAX_BIO_CHARS => Err(ApiError::Validation(format!(
            "Bio must be at most {MAX_BIO_CHARS} characters"
        ))),
        _ => Ok(()),
    }
}
