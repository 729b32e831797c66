use sea_orm::*;
use uuid::Uuid;

use crate::models::posts::{self, CreatePost, UpdatePost};

/// Every post, latest first. The query is not executed here.
///
/// `id` breaks ties between equal timestamps so separate page queries agree on order.
pub fn all_posts() -> Select<posts::Entity> {
    posts::Entity::find()
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
}

/// Posts written by `author_id`, latest first.
pub fn posts_by_author(author_id: i32) -> Select<posts::Entity> {
    all_posts().filter(posts::Column::AuthorId.eq(author_id))
}

/// Insert a new post.
pub async fn insert_post(
    db: &DatabaseConnection,
    input: CreatePost,
    author_id: i32,
) -> Result<posts::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_post = posts::ActiveModel {
        pubkey: Set(Uuid::new_v4()),
        title: Set(input.title),
        content: Set(input.content),
        created_at: Set(now),
        updated_at: Set(now),
        author_id: Set(author_id),
        ..Default::default()
    };

    new_post.insert(db).await
}

/// Fetch a single post by its public key.
pub async fn get_post_by_pubkey(
    db: &DatabaseConnection,
    pubkey: Uuid,
) -> Result<Option<posts::Model>, DbErr> {
    posts::Entity::find()
        .filter(posts::Column::Pubkey.eq(pubkey))
        .one(db)
        .await
}

/// Apply a partial update to an existing post.
pub async fn update_post(
    db: &DatabaseConnection,
    post: posts::Model,
    input: UpdatePost,
) -> Result<posts::Model, DbErr> {
    let mut active: posts::ActiveModel = post.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(content) = input.content {
        active.content = Set(content);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// Delete a post by row ID.
pub async fn delete_post(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    posts::Entity::delete_by_id(id).exec(db).await
}
