use chrono::NaiveDate;
use entity::{employees, users};
use platform_authz::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Condition, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
    sea_query::{Expr, Func},
};

use crate::{DbPool, DbResult, identities::insert_identity};

pub type EmployeeWithOwner = (employees::Model, Option<users::Model>);

/// Column values for a new employee record.
#[derive(Clone, Debug)]
pub struct EmployeeInsert {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub birth_date: NaiveDate,
}

/// Columns to overwrite; `None` leaves a column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
}

/// Creates the employee identity (`ROLE_EMPLOYEE`) and its record in a single
/// transaction.
pub async fn create_employee_with_identity(
    db: &DbPool,
    record: EmployeeInsert,
    email: &str,
    password_hash: &str,
) -> DbResult<(employees::Model, users::Model)> {
    let txn = db.begin().await?;
    let user = insert_identity(&txn, email, password_hash, Role::Employee).await?;
    let employee = employees::ActiveModel {
        first_name: Set(record.first_name),
        last_name: Set(record.last_name),
        position: Set(record.position),
        birth_date: Set(record.birth_date),
        user_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    tracing::debug!(employee_id = employee.id, user_id = %user.id, "employee stored");
    Ok((employee, user))
}

/// All employees, or those whose first or last name contains `search`
/// (case-insensitive), ordered by id.
pub async fn list_employees(db: &DbPool, search: Option<&str>) -> DbResult<Vec<EmployeeWithOwner>> {
    let mut query = employees::Entity::find().find_also_related(users::Entity);
    if let Some(term) = search {
        let pattern = format!("%{}%", term.to_lowercase());
        query = query.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        employees::Entity,
                        employees::Column::FirstName,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        employees::Entity,
                        employees::Column::LastName,
                    ))))
                    .like(pattern),
                ),
        );
    }
    Ok(query
        .order_by_asc(employees::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_employee(db: &DbPool, id: i32) -> DbResult<Option<employees::Model>> {
    Ok(employees::Entity::find_by_id(id).one(db).await?)
}

pub async fn update_employee(
    db: &DbPool,
    model: employees::Model,
    update: EmployeeUpdate,
) -> DbResult<employees::Model> {
    let mut active: employees::ActiveModel = model.clone().into();
    let mut changed = false;
    if let Some(first_name) = update.first_name {
        active.first_name = Set(first_name);
        changed = true;
    }
    if let Some(last_name) = update.last_name {
        active.last_name = Set(last_name);
        changed = true;
    }
    if let Some(position) = update.position {
        active.position = Set(position);
        changed = true;
    }
    if !changed {
        return Ok(model);
    }
    Ok(active.update(db).await?)
}

/// Removes the record only; the owning identity stays.
pub async fn delete_employee(db: &DbPool, id: i32) -> DbResult<bool> {
    let result = employees::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
