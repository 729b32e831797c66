use actix_web::{HttpResponse, Responder, web};
use sea_orm::{DatabaseConnection, Select};
use uuid::Uuid;

use crate::auth::authorization::verify_post_author;
use crate::auth::middleware::AuthenticatedUser;
use crate::config::AppConfig;
use crate::db::posts as post_db;
use crate::models::posts::{self, CreatePost, PostResponse, UpdatePost};
use crate::pagination::{PageQuery, PageRequest, QuerySource, paginate};

async fn paginated_posts(
    db: &DatabaseConnection,
    config: &AppConfig,
    query: &PageQuery,
    select: Select<posts::Entity>,
) -> HttpResponse {
    let request = match PageRequest::from_query(query, &config.pagination) {
        Ok(request) => request,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string(),
            }));
        }
    };

    let source = QuerySource::new(select, db);
    match paginate(&request, &source).await {
        Ok(page) => HttpResponse::Ok().json(page.map(PostResponse::from)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch posts: {e}"),
        })),
    }
}

/// GET /forum/posts: every post, latest first. Query params: ?page=1&size=10
pub async fn list_posts(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    paginated_posts(db.get_ref(), &config, &query, post_db::all_posts()).await
}

/// GET /forum/posts/mine: the caller's own posts, paginated.
pub async fn list_my_posts(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    paginated_posts(
        db.get_ref(),
        &config,
        &query,
        post_db::posts_by_author(user.0.id),
    )
    .await
}

/// POST /forum/posts: publish a post as the authenticated user.
pub async fn create_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreatePost>,
) -> impl Responder {
    let input = body.into_inner();
    if let Err(msg) = input.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }));
    }

    match post_db::insert_post(db.get_ref(), input, user.0.id).await {
        Ok(post) => HttpResponse::Created().json(PostResponse::from(post)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create post: {e}"),
        })),
    }
}

/// GET /forum/posts/{pubkey}: a single post.
pub async fn get_post(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let pubkey = path.into_inner();
    match post_db::get_post_by_pubkey(db.get_ref(), pubkey).await {
        Ok(Some(post)) => HttpResponse::Ok().json(PostResponse::from(post)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Post {pubkey} not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// PUT /forum/posts/{pubkey}: edit a post (author only).
pub async fn update_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePost>,
) -> impl Responder {
    let input = body.into_inner();
    if let Err(msg) = input.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }));
    }

    let post = match verify_post_author(db.get_ref(), path.into_inner(), user.0.id).await {
        Ok(post) => post,
        Err(resp) => return resp,
    };

    match post_db::update_post(db.get_ref(), post, input).await {
        Ok(updated) => HttpResponse::Ok().json(PostResponse::from(updated)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update post: {e}"),
        })),
    }
}

/// DELETE /forum/posts/{pubkey}: remove a post (author only).
pub async fn delete_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let pubkey = path.into_inner();
    let post = match verify_post_author(db.get_ref(), pubkey, user.0.id).await {
        Ok(post) => post,
        Err(resp) => return resp,
    };

    match post_db::delete_post(db.get_ref(), post.id).await {
        Ok(result) if result.rows_affected > 0 => HttpResponse::Ok().json(serde_json::json!({
            "message": format!("Post {pubkey} deleted"),
        })),
        Ok(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Post {pubkey} not found"),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete post: {e}"),
        })),
    }
}
