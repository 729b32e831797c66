use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, indexed)]
    pub pubkey: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string, never the raw password.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} {}", self.username, self.first_name, self.last_name)
    }
}

pub const USERNAME_MAX_LEN: usize = 150;

/// Usernames are stored and looked up without surrounding whitespace.
pub fn normalize_username(raw: &str) -> &str {
    raw.trim()
}

// ── DTOs (not stored in DB, used for request bodies) ──

/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), String> {
        let username = normalize_username(&self.username);
        if username.is_empty() {
            return Err("username must not be blank".to_string());
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(format!(
                "username must be at most {USERNAME_MAX_LEN} characters"
            ));
        }
        if self.password.is_empty() {
            return Err("password must not be blank".to_string());
        }
        Ok(())
    }
}

/// OAuth2 password-flow form used by `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// A safe user representation for API responses (never leaks the hash or row id).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub pubkey: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            pubkey: m.pubkey,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            is_active: m.is_active,
            date_joined: m.date_joined,
            last_login: m.last_login,
        }
    }
}
