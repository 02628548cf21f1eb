//! Authorization primitives for the HR suite.
//!
//! Roles form a closed set. Handlers never compare role strings; they ask a
//! [`Principal`] whether it holds a [`Capability`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{action} denied on {resource}")]
    Denied {
        action: &'static str,
        resource: &'static str,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_EMPLOYEE")]
    Employee,
}

impl Role {
    pub fn grants(self, capability: Capability) -> bool {
        match capability {
            Capability::UpdateAnyEmployee => matches!(self, Role::Admin),
            // Record deletion is reserved to the owning identity.
            Capability::DeleteAnyEmployee => false,
        }
    }
}

/// Actions that bypass record ownership.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    UpdateAnyEmployee,
    DeleteAnyEmployee,
}

impl Capability {
    fn action(self) -> &'static str {
        match self {
            Capability::UpdateAnyEmployee => "update",
            Capability::DeleteAnyEmployee => "delete",
        }
    }
}

/// The authenticated actor of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(id: Uuid, roles: impl IntoIterator<Item = Role>) -> Self {
        let mut roles: Vec<Role> = roles.into_iter().collect();
        roles.sort();
        roles.dedup();
        Self { id, roles }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.roles.iter().any(|role| role.grants(capability))
    }

    /// `true` when `owner` is this principal's identity.
    pub fn is(&self, owner: Option<Uuid>) -> bool {
        owner == Some(self.id)
    }

    pub fn require(&self, capability: Capability, resource: &'static str) -> Result<(), AuthzError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AuthzError::Denied {
                action: capability.action(),
                resource,
            })
        }
    }
}
