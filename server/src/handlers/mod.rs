pub mod auth;
pub mod employees;

use platform_api::ApiError;
use platform_db::DbError;
use products_hr::{PolicyError, ValidationError};

fn db_error(err: DbError) -> ApiError {
    match err {
        DbError::EmailTaken(_) => ApiError::conflict("Email already registered"),
        other => ApiError::internal(other),
    }
}

fn policy_error(err: PolicyError) -> ApiError {
    ApiError::forbidden(err.to_string())
}

fn validation_error(err: ValidationError) -> ApiError {
    ApiError::validation(err.0)
}
