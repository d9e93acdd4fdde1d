//! Owner extraction
//!
//! Authentication happens upstream. The authenticated owner id arrives in a
//! configurable request header (`x-owner-id` by default) and is trusted as is.
//! A missing header is a 401; a blank or undecodable one is a 400.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use jotter_core::OwnerId;

use crate::error::ApiError;
use crate::routes::AppState;

/// The owner the request acts for
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerId);

#[axum::async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(&state.owner_header)
            .ok_or(ApiError::MissingOwner)?;

        let raw = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("Invalid owner id".to_string()))?;
        Ok(Owner(OwnerId::parse(raw)?))
    }
}
