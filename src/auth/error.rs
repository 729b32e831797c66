use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

use super::jwt::TokenType;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("wrong token type, expected {expected}")]
    WrongTokenType { expected: TokenType },

    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),

    #[error("unknown or inactive user")]
    UnknownUser,

    #[error("could not sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0} not configured")]
    Misconfigured(&'static str),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Signing(_) | Self::PasswordHash | Self::Database(_) | Self::Misconfigured(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::UNAUTHORIZED {
            return HttpResponse::Unauthorized()
                .insert_header((WWW_AUTHENTICATE, HeaderValue::from_static("Bearer")))
                .json(serde_json::json!({
                    "error": "Invalid authentication credentials",
                }));
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
