use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::AuthError;
use crate::auth::jwt::{self, TokenType};
use crate::config::AppConfig;
use crate::db::users::get_user_by_id;
use crate::models::users;

/// The user behind a valid `Authorization: Bearer <access token>` header.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req)
                .await
                .map_err(|_| AuthError::MissingToken)?;

            // 2. Get the signing secret from app data.
            let config = req
                .app_data::<web::Data<AppConfig>>()
                .ok_or(AuthError::Misconfigured("app config"))?;

            // 3. Validate the JWT; refresh tokens are not accepted here.
            let claims =
                jwt::validate_token_of_type(bearer.token(), &config.jwt.secret, TokenType::Access)
                    .inspect_err(|e| tracing::debug!("Rejected bearer token: {e}"))?;
            let user_id = claims.user_id()?;

            // 4. Get the database connection.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or(AuthError::Misconfigured("database"))?;

            // 5. Load the user; deleted or deactivated accounts are rejected.
            match get_user_by_id(db.get_ref(), user_id).await? {
                Some(user) if user.is_active => Ok(AuthenticatedUser(user)),
                _ => Err(AuthError::UnknownUser),
            }
        })
    }
}
