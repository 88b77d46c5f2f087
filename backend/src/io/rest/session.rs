//! Session extraction from request headers.
//!
//! Authentication happens upstream; this layer only requires that the
//! caller's user and household ids are present.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::domain::session::SessionContext;
use crate::io::rest::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";
pub const HOUSEHOLD_HEADER: &str = "x-household-id";

fn header_value<'a>(parts: &'a Parts, name: &str) -> &'a str {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SessionContext::new(header_value(parts, USER_HEADER), header_value(parts, HOUSEHOLD_HEADER))
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {} or {} header", USER_HEADER, HOUSEHOLD_HEADER)))
    }
}
