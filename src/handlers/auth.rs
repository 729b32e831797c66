use actix_web::{HttpResponse, Responder, ResponseError, web};
use sea_orm::{DatabaseConnection, SqlErr};
use serde::Deserialize;

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{AuthError, jwt, password};
use crate::config::{AppConfig, JwtConfig};
use crate::db::users as user_db;
use crate::models::users::{CreateUser, LoginForm, UserResponse};

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

fn token_pair_response(user_id: i32, config: &JwtConfig) -> HttpResponse {
    match jwt::issue_pair(user_id, config) {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => {
            tracing::error!("Failed to issue tokens for user {user_id}: {e}");
            e.error_response()
        }
    }
}

/// POST /register: create an account and return a fresh token pair.
pub async fn register(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    body: web::Json<CreateUser>,
) -> impl Responder {
    let input = body.into_inner();
    if let Err(msg) = input.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }));
    }

    let hash = match password::hash_password(&input.password).await {
        Ok(hash) => hash,
        Err(e) => return e.error_response(),
    };

    match user_db::insert_user(db.get_ref(), input, hash).await {
        Ok(user) => {
            tracing::info!("Registered user {user}");
            token_pair_response(user.id, &config.jwt)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Cannot create user.",
            }))
        }
        Err(e) => {
            tracing::error!("Failed to create user: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create user: {e}"),
            }))
        }
    }
}

/// POST /login: OAuth2 password form, returns a token pair.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    form: web::Form<LoginForm>,
) -> impl Responder {
    let form = form.into_inner();
    let incorrect = || {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Incorrect username or password.",
        }))
    };

    let user = match user_db::get_user_by_username(db.get_ref(), &form.username).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => return incorrect(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }));
        }
    };

    match password::verify_password(&form.password, &user.password).await {
        Ok(true) => {}
        Ok(false) => return incorrect(),
        Err(e) => {
            tracing::error!("Stored password hash for {} is unusable: {e}", user.username);
            return e.error_response();
        }
    }

    let user_id = user.id;
    if let Err(e) = user_db::touch_last_login(db.get_ref(), user).await {
        tracing::warn!("Failed to record last login for user {user_id}: {e}");
    }

    token_pair_response(user_id, &config.jwt)
}

/// POST /token/refresh: trade a refresh token for a new pair.
pub async fn refresh(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    body: web::Json<RefreshRequest>,
) -> impl Responder {
    let (user_id, pair) = match jwt::refresh_pair(&body.refresh, &config.jwt) {
        Ok(result) => result,
        Err(e) => return e.error_response(),
    };

    match user_db::get_user_by_id(db.get_ref(), user_id).await {
        Ok(Some(user)) if user.is_active => HttpResponse::Ok().json(pair),
        Ok(_) => AuthError::UnknownUser.error_response(),
        Err(e) => AuthError::from(e).error_response(),
    }
}

/// GET /me: return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}
