//! Domain service for authentication and user management.
//!
//! Handles signup, login, token verification, and the admin user surface.

use serde::Serialize;
use thiserror::Error;

use crate::db::{ProfileUpdate, User};
use crate::domain::Role;
use crate::services::token::{CurrentUser, TokenError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown phone and wrong password both map here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Generation(msg) => Self::Internal(msg),
            TokenError::Expired | TokenError::Invalid(_) => Self::InvalidToken,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    /// Defaults to `user` when absent.
    pub role: Option<String>,
}

/// Token plus the public view of the user it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a user and signs them in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for missing fields and
    /// [`AuthError::Conflict`] when the phone or email is taken.
    async fn signup(&self, input: SignupInput) -> Result<AuthResult, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown phone or a
    /// wrong password alike.
    async fn login(&self, phone: &str, password: &str) -> Result<AuthResult, AuthError>;

    /// Pure signature and expiry check.
    fn verify(&self, token: &str) -> Result<CurrentUser, AuthError>;

    async fn me(&self, user_id: i32) -> Result<User, AuthError>;

    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    async fn get_user(&self, user_id: i32) -> Result<User, AuthError>;

    /// Admin-initiated account creation. No token is issued.
    async fn create_user(&self, input: SignupInput) -> Result<User, AuthError>;

    async fn change_role(&self, user_id: i32, role: &str) -> Result<User, AuthError>;

    async fn update_profile(&self, user_id: i32, update: ProfileUpdate)
    -> Result<User, AuthError>;

    async fn delete_user(&self, user_id: i32) -> Result<(), AuthError>;
}

/// Parses a role name, rejecting anything but the known roles.
pub fn parse_role(role: Option<&str>) -> Result<Role, AuthError> {
    match role {
        None => Ok(Role::User),
        Some(value) => value
            .parse()
            .map_err(|_| AuthError::Validation("Role must be either 'admin' or 'user'".to_string())),
    }
}
