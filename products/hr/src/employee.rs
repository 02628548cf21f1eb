use chrono::{DateTime, NaiveDate};
use platform_authn::Credentials;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Body of `POST /api/employees/`. Every field is required; presence is
/// checked by [`NewEmployeeRequest::validate`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub birth_date: NaiveDate,
    pub credentials: Credentials,
}

impl NewEmployeeRequest {
    pub fn validate(self) -> Result<NewEmployee, ValidationError> {
        let first_name = required("firstName", self.first_name)?;
        let last_name = required("lastName", self.last_name)?;
        let position = required("position", self.position)?;
        let birth_date = parse_birth_date(&required("birthDate", self.birth_date)?)?;
        let credentials = Credentials::from_parts(self.email, self.password)
            .map_err(|err| ValidationError(err.to_string()))?;
        Ok(NewEmployee {
            first_name,
            last_name,
            position,
            birth_date,
            credentials,
        })
    }
}

/// Body of `PUT /api/employees/{id}`; absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
}

impl EmployeePatch {
    /// Trims present values and rejects blank ones.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: self
                .first_name
                .map(|v| required("firstName", Some(v)))
                .transpose()?,
            last_name: self
                .last_name
                .map(|v| required("lastName", Some(v)))
                .transpose()?,
            position: self
                .position
                .map(|v| required("position", Some(v)))
                .transpose()?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ValidationError(format!("{field} is required"))),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part is kept).
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError("birthDate must be a date (YYYY-MM-DD)".into()))
}

/// Blank search terms mean "no filter".
pub fn normalize_search(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
