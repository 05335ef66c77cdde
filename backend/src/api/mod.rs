//! API handlers.

pub mod diagnostics;
pub mod sse;
pub mod telemetry;
pub mod version;

use axum::extract::{FromRequest, Request};
use axum::{http::StatusCode, Json};
use devdiag_types::api::ErrorResponse;
use serde::de::DeserializeOwned;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

pub(crate) fn error_with_details(
    status: StatusCode,
    message: impl Into<String>,
    details: impl std::fmt::Display,
) -> ApiError {
    (
        status,
        Json(ErrorResponse::with_details(message, details.to_string())),
    )
}

/// Run garde validation on a request body, mapping failures to 400.
pub(crate) fn validate<T: garde::Validate<Context = ()>>(request: &T) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|report| error_with_details(StatusCode::BAD_REQUEST, "Invalid request", report))
}

/// JSON request body that has been deserialized and validated.
///
/// Malformed or mistyped bodies are rejected with 400 like any other
/// invalid request.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + garde::Validate<Context = ()>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                error_with_details(
                    StatusCode::BAD_REQUEST,
                    "Invalid request",
                    rejection.body_text(),
                )
            })?;
        validate(&value)?;
        Ok(Self(value))
    }
}
