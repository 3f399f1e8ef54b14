use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a hex ObjectId
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: TokenType, actual: TokenType },
}

pub trait JwtTokenUtils {
    fn generate_token_pair(&self, user_id: &str, email: &str, role: &str) -> Result<TokenPair, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

/// HS256 signer/verifier over the configured secret.
#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    pub fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        token_type: TokenType,
        expires_in_minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
            token_type,
            jti: Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|err| {
            error!("Failed to sign {} token: {}", token_type, err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    /// Checks signature, expiry and that the token is of the `expected` kind.
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let claims = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => {
                    warn!("Rejected {} token: {}", expected, err);
                    JwtError::DecodingFailed(err.to_string())
                }
            })?
            .claims;

        if claims.token_type != expected {
            return Err(JwtError::InvalidTokenType { expected, actual: claims.token_type });
        }
        debug!(user = %claims.sub, "Token accepted");
        Ok(claims)
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_token_pair(&self, user_id: &str, email: &str, role: &str) -> Result<TokenPair, JwtError> {
        let config = &self.jwt_config;
        Ok(TokenPair {
            access_token: self.generate_token(user_id, email, role, TokenType::Access, config.access_token_expiration)?,
            refresh_token: self.generate_token(user_id, email, role, TokenType::Refresh, config.refresh_token_expiration)?,
            expires_in: config.access_token_expiration * 60,
            token_type: "Bearer".to_string(),
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenType::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenType::Refresh)
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        match auth_header.strip_prefix("Bearer ").map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(JwtError::InvalidToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utils() -> JwtTokenUtilsImpl {
        JwtTokenUtilsImpl::new(JwtConfig::default())
    }

    #[test]
    fn test_token_pair_round_trip() {
        let jwt = utils();
        let pair = jwt.generate_token_pair("64f000000000000000000001", "admin@example.com", "admin").unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 15 * 60);

        let claims = jwt.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.email, "admin@example.com");
        assert!(jwt.validate_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = utils();
        let pair = jwt.generate_token_pair("u1", "u1@example.com", "user").unwrap();
        assert!(matches!(
            jwt.validate_access_token(&pair.refresh_token),
            Err(JwtError::InvalidTokenType { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = utils();
        let token = jwt.generate_token("u1", "u1@example.com", "user", TokenType::Access, -10).unwrap();
        assert!(matches!(jwt.validate_access_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let other = JwtTokenUtilsImpl::new(JwtConfig {
            jwt_secret: "another_secret_that_is_long_enough_to_pass_validation".to_string(),
            ..JwtConfig::default()
        });
        let pair = other.generate_token_pair("u1", "u1@example.com", "user").unwrap();
        assert!(matches!(utils().validate_access_token(&pair.access_token), Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_extract_token_from_header() {
        let jwt = utils();
        assert_eq!(jwt.extract_token_from_header("Bearer abc.def").unwrap(), "abc.def");
        assert!(jwt.extract_token_from_header("Basic abc").is_err());
        assert!(jwt.extract_token_from_header("Bearer   ").is_err());
    }
}
