//! sea-orm entities for identities and employee records.

pub mod employees;
pub mod user_roles;
pub mod users;
