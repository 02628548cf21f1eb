use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use platform_api::{ApiError, ApiResult, MessageBody};
use platform_authn::{Credentials, hash_password, issue_token, normalize_email, verify_password};
use platform_authz::Role;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::db_error;
use crate::{http::AppState, session::CurrentUser};

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsBody {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenBody {
    token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    email: String,
    roles: Vec<Role>,
}

/// Self-registration. Every self-registered identity is an administrator.
#[instrument(name = "http.auth.register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageBody>)> {
    let Json(body) = payload?;
    let credentials = Credentials::from_parts(body.email, body.password)
        .map_err(|err| ApiError::validation(err.to_string()))?;
    let password_hash = hash_password(&credentials.password).map_err(ApiError::internal)?;
    let identity =
        platform_db::create_identity(&state.pool, &credentials.email, &password_hash, Role::Admin)
            .await
            .map_err(db_error)?;
    info!(user_id = %identity.user.id, "identity registered");
    Ok((
        StatusCode::CREATED,
        MessageBody::new("User registered successfully"),
    ))
}

#[instrument(name = "http.auth.login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> ApiResult<Json<TokenBody>> {
    let Json(body) = payload?;
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(invalid());
    };
    let email = normalize_email(&email).map_err(|_| invalid())?;
    let identity = platform_db::find_identity_by_email(&state.pool, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(invalid)?;
    if !verify_password(&password, &identity.user.password_hash) {
        return Err(invalid());
    }

    let token = issue_token(&identity.principal(), &state.config.auth).map_err(ApiError::internal)?;
    info!(user_id = %identity.user.id, "login succeeded");
    Ok(Json(TokenBody { token }))
}

pub async fn profile(user: CurrentUser) -> Json<ProfileBody> {
    Json(ProfileBody {
        email: user.email,
        roles: user.principal.roles,
    })
}
