use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Owner of the request, as asserted by the authenticating proxy.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing user id"))?;

        let uuid = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::unauthorized("invalid user id"))?;

        Ok(CurrentUser(UserId::from_uuid(uuid)))
    }
}
