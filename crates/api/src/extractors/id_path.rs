//! Path parameter extractor for resource ids.
//!
//! A segment that does not parse as an id cannot name a stored record, so it
//! is answered like any other unknown id: a bare 404 through
//! [`ApiError::NotFound`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Typed path parameters, e.g. `IdPath<Uuid>` or `IdPath<(Uuid, Uuid)>`.
#[derive(Debug, Clone)]
pub struct IdPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(IdPath(value)),
            // Route and extractor disagree on the parameters.
            Err(rejection) if rejection.status().is_server_error() => {
                Err(ApiError::Internal(rejection.body_text()))
            }
            Err(rejection) => Err(ApiError::NotFound(rejection.body_text())),
        }
    }
}
