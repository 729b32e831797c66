use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::JwtConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims carried by both halves of a token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's row id, as a string.
    pub sub: String,
    pub token_type: TokenType,
    /// Unique per token, so two pairs minted in the same second still differ.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: i32, token_type: TokenType, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
        }
    }

    /// Extract the user id from the `sub` claim.
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }
}

/// Body returned by `/register`, `/login` and `/token/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh_token: String,
    pub access_token: String,
    pub token_type: String,
}

/// Sign claims with HS256.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Validate signature and expiry and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Like [`validate_token`], but also require a specific token type.
pub fn validate_token_of_type(
    token: &str,
    secret: &str,
    expected: TokenType,
) -> Result<Claims, AuthError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != expected {
        return Err(AuthError::WrongTokenType { expected });
    }
    Ok(claims)
}

/// Mint a fresh access/refresh pair for a user.
pub fn issue_pair(user_id: i32, config: &JwtConfig) -> Result<TokenPair, AuthError> {
    let refresh = Claims::new(user_id, TokenType::Refresh, config.refresh_ttl_secs);
    let access = Claims::new(user_id, TokenType::Access, config.access_ttl_secs);

    Ok(TokenPair {
        refresh_token: encode_token(&refresh, &config.secret)?,
        access_token: encode_token(&access, &config.secret)?,
        token_type: "bearer".to_string(),
    })
}

/// Trade a refresh token for a new pair. Returns the user id alongside it.
pub fn refresh_pair(refresh_token: &str, config: &JwtConfig) -> Result<(i32, TokenPair), AuthError> {
    let claims = validate_token_of_type(refresh_token, &config.secret, TokenType::Refresh)?;
    let user_id = claims.user_id()?;
    Ok((user_id, issue_pair(user_id, config)?))
}
