use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CreateUser, normalize_username};

/// Insert a new user. `password_hash` must already be hashed.
pub async fn insert_user(
    db: &DatabaseConnection,
    input: CreateUser,
    password_hash: String,
) -> Result<users::Model, DbErr> {
    let new_user = users::ActiveModel {
        pubkey: Set(Uuid::new_v4()),
        username: Set(normalize_username(&input.username).to_string()),
        password: Set(password_hash),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        is_active: Set(true),
        date_joined: Set(chrono::Utc::now()),
        last_login: Set(None),
        ..Default::default()
    };

    new_user.insert(db).await
}

/// Fetch a single user by row ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Lookup query for a username, normalized the same way as on insert.
pub fn find_by_username(username: &str) -> Select<users::Entity> {
    users::Entity::find().filter(users::Column::Username.eq(normalize_username(username)))
}

/// Fetch a single user by username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    find_by_username(username).one(db).await
}

/// Record a successful login.
pub async fn touch_last_login(
    db: &DatabaseConnection,
    user: users::Model,
) -> Result<users::Model, DbErr> {
    let mut active: users::ActiveModel = user.into();
    active.last_login = Set(Some(chrono::Utc::now()));
    active.update(db).await
}
