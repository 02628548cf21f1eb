use crate::AuthnError;

/// Validated email + raw password pair.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_parts(
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self, AuthnError> {
        let email = email.ok_or_else(|| AuthnError::InvalidInput("email is required".into()))?;
        let password = password
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AuthnError::InvalidInput("password is required".into()))?;
        Ok(Self {
            email: normalize_email(&email)?,
            password,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub fn normalize_email(value: &str) -> Result<String, AuthnError> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(AuthnError::InvalidInput("email is required".into()));
    }
    if !trimmed.contains('@') {
        return Err(AuthnError::InvalidInput("invalid email address".into()));
    }
    Ok(trimmed)
}
