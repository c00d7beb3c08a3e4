use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;
use uuid::Uuid;

use super::password::verify_password;
use super::session;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{self, User};

/// Resolves the request to an authenticated identity via the session cookie
/// or basic credentials. Rejects with 403 before any handler logic runs.
#[derive(Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = session_token(parts, &state.config.session.cookie_name) {
            if let Some(user) = session::find_user_by_token(&state.db, token).await? {
                return Ok(AuthUser(user));
            }
            warn!("stale or unknown session token");
        }

        if let Some((identifier, password)) = basic_credentials(parts) {
            if let Some(user) = verify_basic(state, &identifier, &password).await? {
                return Ok(AuthUser(user));
            }
            warn!("basic auth verification failed");
        }

        Err(ApiError::AuthRequired)
    }
}

async fn verify_basic(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = repo::find_by_identifier(&state.db, identifier).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    // OAuth-created accounts carry no hash and never pass password auth.
    let Some(hash) = user.password_hash.as_deref() else {
        return Ok(None);
    };
    if verify_password(password, hash).unwrap_or(false) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

fn session_token(parts: &Parts, cookie_name: &str) -> Option<Uuid> {
    let header = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_value(header, cookie_name).and_then(|v| Uuid::parse_str(v).ok())
}

pub(crate) fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

fn basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    parse_basic(header)
}

pub(crate) fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "csrftoken=abc; sessionid=51c5c8ac-8f2a-4572-b031-f2b7c2b73333; other=1";
        assert_eq!(
            cookie_value(header, "sessionid"),
            Some("51c5c8ac-8f2a-4572-b031-f2b7c2b73333")
        );
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_ignores_prefix_matches() {
        assert_eq!(cookie_value("xsessionid=abc", "sessionid"), None);
    }

    #[test]
    fn parse_basic_decodes_credentials() {
        // base64("testuser:testpassword123")
        let header = format!("Basic {}", STANDARD.encode("testuser:testpassword123"));
        assert_eq!(
            parse_basic(&header),
            Some(("testuser".into(), "testpassword123".into()))
        );
    }

    #[test]
    fn parse_basic_keeps_colons_in_password() {
        let header = format!("Basic {}", STANDARD.encode("user:pa:ss"));
        assert_eq!(parse_basic(&header), Some(("user".into(), "pa:ss".into())));
    }

    #[test]
    fn parse_basic_rejects_other_schemes() {
        assert_eq!(parse_basic("Bearer sometoken"), None);
        assert_eq!(parse_basic("Basic !!!not-base64!!!"), None);
    }
}
