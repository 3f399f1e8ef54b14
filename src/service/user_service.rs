use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::user_dto::{AuthTokens, UserAuthResponse, UserProfile};
use crate::model::user::User;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, TokenPair};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::period::now_timestamp;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, user: User, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError>;
    async fn me(&self, user_id: &str) -> Result<UserProfile, ServiceError>;
    async fn change_password(
        &self,
        user_id: &str,
        current_password: String,
        new_password: String,
    ) -> Result<(), ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl From<TokenPair> for AuthTokens {
    fn from(tokens: TokenPair) -> Self {
        AuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

fn check_strength(password: &str) -> Result<(), ServiceError> {
    PasswordUtilsImpl::validate_password_strength(password)
        .map_err(|problems| ServiceError::InvalidInput(problems.join("; ")))
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self { user_repo, jwt_utils }
    }

    /// Lifetime of the refresh token, in seconds, for the cookie.
    pub fn refresh_token_max_age(&self) -> i64 {
        self.jwt_utils.jwt_config.refresh_token_expiration * 60
    }

    fn issue_tokens(&self, user: &User) -> Result<AuthTokens, ServiceError> {
        let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        self.jwt_utils
            .generate_token_pair(&user_id, &user.email, &user.role)
            .map(AuthTokens::from)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn load_user(&self, user_id: &str) -> Result<User, ServiceError> {
        let id = ObjectId::parse_str(user_id)
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;
        self.user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, user, password), fields(username = %user.username, email = %user.email))]
    async fn register(&self, mut user: User, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("Registering new user");
        check_strength(&password)?;
        user.email = user.email.trim().to_lowercase();
        user.password_hash = PasswordUtilsImpl::hash_password(&password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let now = now_timestamp();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);

        let inserted = self.user_repo.insert(user).await.map_err(|e| {
            error!("Failed to insert user: {}", e);
            ServiceError::from(e)
        })?;
        let tokens = self.issue_tokens(&inserted)?;
        info!("User registered successfully");
        Ok(UserAuthResponse { user: inserted.into(), tokens })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("User login attempt");
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());
        let user = match self.user_repo.find_by_email(&email.trim().to_lowercase()).await? {
            Some(user) => user,
            None => {
                warn!("Login for unknown email");
                return Err(invalid());
            }
        };
        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid credentials");
            return Err(invalid());
        }
        let tokens = self.issue_tokens(&user)?;
        info!("User logged in successfully");
        Ok(UserAuthResponse { user: user.into(), tokens })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        // The account may have been removed since the token was issued.
        let user = self.load_user(&claims.sub).await.map_err(|e| match e {
            ServiceError::NotFound(_) => ServiceError::Unauthorized("Unknown user".to_string()),
            other => other,
        })?;
        let tokens = self.issue_tokens(&user)?;
        info!("Token refreshed successfully");
        Ok(tokens)
    }

    #[instrument(skip(self))]
    async fn me(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        Ok(self.load_user(user_id).await?.into())
    }

    #[instrument(skip(self, current_password, new_password))]
    async fn change_password(
        &self,
        user_id: &str,
        current_password: String,
        new_password: String,
    ) -> Result<(), ServiceError> {
        let mut user = self.load_user(user_id).await?;
        let valid = PasswordUtilsImpl::verify_password(&current_password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            return Err(ServiceError::InvalidInput("Current password is incorrect".to_string()));
        }
        check_strength(&new_password)?;
        user.password_hash = PasswordUtilsImpl::hash_password(&new_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        user.updated_at = Some(now_timestamp());
        let id = user.id.ok_or_else(|| ServiceError::InternalError("User without an ID".to_string()))?;
        self.user_repo.update(id, user).await?;
        info!("Password changed");
        Ok(())
    }
}
