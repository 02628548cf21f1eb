//! Authorization rules for mutating employee records.
//!
//! Both checks are pure: they take the acting principal, the record's owning
//! identity and the request, and return what may be applied.

use platform_authz::{AuthzError, Capability, Principal};
use thiserror::Error;
use uuid::Uuid;

use crate::employee::EmployeePatch;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The owner asked to change something other than their position.
    #[error("You can only change your own position.")]
    NoFieldToChange,
    #[error("You are not permitted to {action} this employee.")]
    NotPermitted { action: &'static str },
}

impl From<AuthzError> for PolicyError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Denied { action, .. } => PolicyError::NotPermitted { action },
        }
    }
}

/// Decides whether the actor may edit a record owned by `owner` at all,
/// independently of what the request asks for.
pub fn authorize_edit(actor: &Principal, owner: Option<Uuid>) -> Result<(), PolicyError> {
    if actor.can(Capability::UpdateAnyEmployee) || actor.is(owner) {
        Ok(())
    } else {
        Err(PolicyError::NotPermitted { action: "edit" })
    }
}

/// Returns the subset of `requested` the actor may apply to a record owned by
/// `owner`.
///
/// Admins may change any of first name, last name and position. The owning
/// identity may change its position only; other requested fields are dropped.
pub fn authorize_update(
    actor: &Principal,
    owner: Option<Uuid>,
    requested: EmployeePatch,
) -> Result<EmployeePatch, PolicyError> {
    authorize_edit(actor, owner)?;
    if actor.can(Capability::UpdateAnyEmployee) {
        return Ok(requested);
    }
    match requested.position {
        Some(position) => Ok(EmployeePatch {
            position: Some(position),
            ..EmployeePatch::default()
        }),
        None => Err(PolicyError::NoFieldToChange),
    }
}

/// Only the owning identity may delete a record; no role overrides this.
pub fn authorize_delete(actor: &Principal, owner: Option<Uuid>) -> Result<(), PolicyError> {
    if actor.is(owner) {
        return Ok(());
    }
    actor.require(Capability::DeleteAnyEmployee, "employee")?;
    Ok(())
}
