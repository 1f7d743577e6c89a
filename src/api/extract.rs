//! Request extractors that reject with [`AppError`] instead of axum's plain-text bodies

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Path parameters, rejected as `InvalidInput`
#[derive(Debug)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string, rejected as `InvalidInput`
#[derive(Debug)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// JSON request body, rejected as `InvalidInput`
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[derive(Debug, serde::Deserialize)]
    struct Limit {
        n: Option<usize>,
    }

    #[tokio::test]
    async fn test_query_rejection_is_invalid_input() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/recommendations/1?n=abc")
            .body(axum::body::Body::empty())
            .unwrap()
            .into_parts();

        let err = Query::<Limit>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_query_accepts_valid_limit() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/recommendations/1?n=3")
            .body(axum::body::Body::empty())
            .unwrap()
            .into_parts();

        let Query(limit) = Query::<Limit>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(limit.n, Some(3));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_input() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/users")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let err = JsonBody::<serde_json::Value>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
