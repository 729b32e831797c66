use actix_web::HttpResponse;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::posts as post_db;
use crate::models::posts::Model;

/// Load a post and make sure `user_id` wrote it.
pub async fn verify_post_author(
    db: &DatabaseConnection,
    pubkey: Uuid,
    user_id: i32,
) -> Result<Model, HttpResponse> {
    match post_db::get_post_by_pubkey(db, pubkey).await {
        Ok(Some(post)) if post.author_id == user_id => Ok(post),
        Ok(Some(_)) => Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You are not the author of this post",
        }))),
        Ok(None) => Err(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Post {pubkey} not found"),
        }))),
        Err(e) => Err(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        }))),
    }
}
