//! Request validation
//!
//! Provides a `ValidatedJson` extractor that validates request bodies using the validator crate.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use domain::DomainError;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// A JSON extractor that also validates the request body
///
/// Malformed JSON and failed validation are both answered with 400 in the
/// usual [`ApiError`] body.
///
/// # Example
///
/// ```ignore
/// use validator::Validate;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateDepartment {
///     #[validate(length(min = 1, max = 200))]
///     name: String,
/// }
///
/// async fn handler(ValidatedJson(req): ValidatedJson<CreateDepartment>) {
///     // req is validated
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        value.validate().map_err(DomainError::from)?;

        Ok(Self(value))
    }
}
