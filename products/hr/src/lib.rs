//! HR vertical slice: who may change which employee fields, how employee input
//! is validated, and the welcome notification sent to new hires.

pub mod employee;
pub mod policy;
pub mod welcome;

pub use employee::{EmployeePatch, NewEmployee, NewEmployeeRequest, ValidationError, normalize_search};
pub use policy::{PolicyError, authorize_delete, authorize_edit, authorize_update};
pub use welcome::welcome_email;
