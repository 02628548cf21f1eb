use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use entity::{employees, users};
use platform_api::{ApiError, ApiResult, MessageBody};
use platform_authn::hash_password;
use platform_db::{EmployeeInsert, EmployeeUpdate};
use products_hr::{
    EmployeePatch, NewEmployeeRequest, authorize_delete, authorize_edit, authorize_update,
    normalize_search, welcome_email,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{db_error, policy_error, validation_error};
use crate::{http::AppState, session::CurrentUser};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    id: i32,
    first_name: String,
    last_name: String,
    email: Option<String>,
    position: String,
    birth_date: NaiveDate,
}

impl From<(employees::Model, Option<users::Model>)> for EmployeeSummary {
    fn from((employee, owner): (employees::Model, Option<users::Model>)) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: owner.map(|user| user.email),
            position: employee.position,
            birth_date: employee.birth_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedBody {
    message: String,
    id: i32,
}

#[instrument(name = "http.employees.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<EmployeeSummary>>> {
    let search = normalize_search(query.search);
    let rows = platform_db::list_employees(&state.pool, search.as_deref())
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(rows.into_iter().map(EmployeeSummary::from).collect()))
}

#[instrument(name = "http.employees.create", skip_all, fields(actor = %user.principal.id))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<NewEmployeeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedBody>)> {
    let Json(request) = payload?;
    let new_employee = request.validate().map_err(validation_error)?;
    let password_hash =
        hash_password(&new_employee.credentials.password).map_err(ApiError::internal)?;

    let (employee, identity) = platform_db::create_employee_with_identity(
        &state.pool,
        EmployeeInsert {
            first_name: new_employee.first_name,
            last_name: new_employee.last_name,
            position: new_employee.position,
            birth_date: new_employee.birth_date,
        },
        &new_employee.credentials.email,
        &password_hash,
    )
    .await
    .map_err(db_error)?;
    info!(employee_id = employee.id, "employee created");

    let email = welcome_email(
        &identity.email,
        &employee.first_name,
        &employee.last_name,
        &employee.position,
    );
    if let Err(err) = state.mailer.send(&email).await {
        warn!(employee_id = employee.id, error = %err, "welcome email not delivered");
    }

    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            message: "Employee created successfully".into(),
            id: employee.id,
        }),
    ))
}

#[instrument(name = "http.employees.update", skip_all, fields(actor = %user.principal.id))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<EmployeePatch>, JsonRejection>,
) -> ApiResult<Json<MessageBody>> {
    let employee = load_employee(&state, &id).await?;
    authorize_edit(&user.principal, employee.user_id).map_err(policy_error)?;
    let Json(requested) = payload?;

    let allowed = authorize_update(&user.principal, employee.user_id, requested)
        .map_err(policy_error)?
        .validate()
        .map_err(validation_error)?;
    let employee_id = employee.id;
    platform_db::update_employee(
        &state.pool,
        employee,
        EmployeeUpdate {
            first_name: allowed.first_name,
            last_name: allowed.last_name,
            position: allowed.position,
        },
    )
    .await
    .map_err(ApiError::internal)?;
    info!(employee_id, "employee updated");
    Ok(MessageBody::new("Employee updated successfully"))
}

#[instrument(name = "http.employees.delete", skip_all, fields(actor = %user.principal.id))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let employee = load_employee(&state, &id).await?;
    authorize_delete(&user.principal, employee.user_id).map_err(policy_error)?;

    let removed = platform_db::delete_employee(&state.pool, employee.id)
        .await
        .map_err(ApiError::internal)?;
    if !removed {
        return Err(ApiError::NotFound);
    }
    info!(employee_id = employee.id, "employee deleted");
    Ok(MessageBody::new("Employee deleted successfully"))
}

#[instrument(name = "http.employees.positions", skip_all)]
pub async fn positions(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.positions.fetch().await?))
}

/// Ids that are not integers cannot name a record, so they are reported as
/// missing rather than malformed.
async fn load_employee(state: &AppState, raw_id: &str) -> ApiResult<employees::Model> {
    let id: i32 = raw_id.parse().map_err(|_| ApiError::NotFound)?;
    platform_db::find_employee(&state.pool, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound)
}
