use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::domain::access_gateway::Identity;
use crate::io::rest::error::ApiError;
use crate::AppState;

/// Extractor for the authenticated caller, from `Authorization: Bearer <token>`
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default();

        let identity = state.access_gateway.authenticate(token).await?;
        Ok(AuthUser(identity))
    }
}
