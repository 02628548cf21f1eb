use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use platform_api::ApiError;
use platform_authn::decode_token;
use platform_authz::Principal;
use tracing::debug;

use crate::http::AppState;

/// Identity behind the request's bearer token.
///
/// Roles are reloaded from the store so revoked identities stop working
/// before their token expires.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub principal: Principal,
    pub email: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Authentication required"))?;

        let claims = decode_token(bearer.token(), &state.config.auth).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        let identity = platform_db::find_identity(&state.pool, claims.sub)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::unauthorized("Unknown identity"))?;

        let principal = identity.principal();
        if principal.roles != claims.roles {
            debug!(user_id = %principal.id, "token roles are stale; using stored roles");
        }
        Ok(Self {
            principal,
            email: identity.user.email,
        })
    }
}
