//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{NewUser, ProfileUpdate, Store, User, is_unique_violation};
use crate::services::auth_service::{
    AuthError, AuthResult, AuthService, MIN_PASSWORD_LEN, SignupInput, parse_role,
};
use crate::services::token::{CurrentUser, TokenService};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn validate_signup(input: &SignupInput) -> Result<NewUser, AuthError> {
        let name = input.name.trim();
        let email = input.email.trim();
        let phone = input.phone.trim();

        if name.is_empty() || email.is_empty() || phone.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "All fields are required: name, email, password and phone".to_string(),
            ));
        }

        if !email.contains('@') {
            return Err(AuthError::Validation("Valid email is required".to_string()));
        }

        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: input.password.clone(),
            role: parse_role(input.role.as_deref())?,
        })
    }

    /// Checks both unique fields up front so the caller learns which one
    /// collided. The insert still maps a racing duplicate to a conflict.
    async fn insert_user(&self, user: NewUser) -> Result<User, AuthError> {
        if self.store.get_user_by_email(&user.email).await?.is_some() {
            return Err(AuthError::Conflict("Email already registered".to_string()));
        }

        if self.store.get_user_by_phone(&user.phone).await?.is_some() {
            return Err(AuthError::Conflict(
                "Phone number already registered".to_string(),
            ));
        }

        match self.store.create_user(user, &self.security).await {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "User created");
                Ok(user)
            }
            Err(err) if is_unique_violation(&err) => Err(AuthError::Conflict(
                "Email or phone number already registered".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn issue(&self, user: User) -> Result<AuthResult, AuthError> {
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(AuthResult { token, user })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, input: SignupInput) -> Result<AuthResult, AuthError> {
        let new_user = Self::validate_signup(&input)?;
        let user = self.insert_user(new_user).await?;
        self.issue(user)
    }

    async fn login(&self, phone: &str, password: &str) -> Result<AuthResult, AuthError> {
        let phone = phone.trim();
        if phone.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Phone and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .verify_user_password(phone, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!(user_id = user.id, "User logged in");
        self.issue(user)
    }

    fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        Ok(self.tokens.verify(token)?)
    }

    async fn me(&self, user_id: i32) -> Result<User, AuthError> {
        self.get_user(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_users().await?)
    }

    async fn get_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn create_user(&self, input: SignupInput) -> Result<User, AuthError> {
        let new_user = Self::validate_signup(&input)?;
        self.insert_user(new_user).await
    }

    async fn change_role(&self, user_id: i32, role: &str) -> Result<User, AuthError> {
        let role = parse_role(Some(role))?;

        let user = self
            .store
            .update_user_role(user_id, role)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id, role = %role, "User role changed");
        Ok(user)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let update = ProfileUpdate {
            name: update.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            email: update.email.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            phone: update.phone.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        };

        if update.email.as_ref().is_some_and(|e| !e.contains('@')) {
            return Err(AuthError::Validation("Valid email is required".to_string()));
        }

        match self.store.update_user_profile(user_id, update).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthError::UserNotFound),
            Err(err) if is_unique_violation(&err) => Err(AuthError::Conflict(
                "Email or phone number already registered".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_user(&self, user_id: i32) -> Result<(), AuthError> {
        if self.store.delete_user(user_id).await? {
            info!(user_id, "User deleted");
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}
