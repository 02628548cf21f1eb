//! Platform authentication helpers.
//!
//! Identities authenticate with an email + password pair. Passwords are stored
//! as argon2 PHC strings; successful logins receive an HS256 JWT.

mod credentials;
mod password;
mod token;

use thiserror::Error;

pub use credentials::{Credentials, normalize_email};
pub use password::{hash_password, verify_password};
pub use token::{AuthConfig, SessionClaims, decode_token, issue_token};

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
