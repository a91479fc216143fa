//! Request extractors with libris error semantics.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body parsed into `T`.
///
/// Unlike [`axum::Json`], the `Content-Type` header is not checked, and every
/// JSON failure (malformed JSON, missing field, wrong type) is reported as
/// `400 Bad Request`. A body over the size limit is `413 Payload Too Large`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_error)?;

        let Json(value) = Json::<T>::from_bytes(&bytes)
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(Self(value))
    }
}

fn body_error(rejection: BytesRejection) -> AppError {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::payload_too_large(rejection.body_text()),
        _ => AppError::bad_request(rejection.body_text()),
    }
}
