use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `axum::Json` with deserialization failures mapped onto the JSON error
/// contract instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::Validation(e.body_text()))?;
        Ok(AppJson(value))
    }
}

/// `axum::Query` with the same treatment for malformed query strings.
#[derive(Debug)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| ApiError::Validation(e.body_text()))?;
        Ok(AppQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, StatusCode},
        response::IntoResponse,
    };

    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct LoginShape {
        #[allow(dead_code)]
        username: String,
        #[allow(dead_code)]
        password: String,
    }

    #[derive(Debug, serde::Deserialize)]
    struct PageShape {
        #[allow(dead_code)]
        page: i64,
    }

    #[tokio::test]
    async fn malformed_json_body_gets_json_error() {
        let req = Request::builder()
            .method("POST")
            .uri("/login/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username": "testuser"#))
            .unwrap();
        let err = AppJson::<LoginShape>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let resp = err.into_response();
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_json_field_gets_json_error() {
        let req = Request::builder()
            .method("POST")
            .uri("/login/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username": "testuser"}"#))
            .unwrap();
        let err = AppJson::<LoginShape>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_query_param_gets_json_error() {
        let (mut parts, _) = Request::builder()
            .uri("/favorite-stocks/?page=abc")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let err = AppQuery::<PageShape>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let resp = err.into_response();
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
