pub mod auth;
pub mod forum;

use actix_web::{HttpResponse, error, web};

/// Malformed `?page=`/`?size=` values get the same JSON error body as out-of-range ones.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({
            "error": format!("invalid page request: {err}"),
        });
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (public, except /me) ──
    cfg.route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/token/refresh", web::post().to(auth::refresh))
        .route("/me", web::get().to(auth::me));

    // ── Forum routes (all protected, require a valid access token) ──
    cfg.service(
        web::scope("/forum")
            .app_data(query_config())
            .route("/posts", web::get().to(forum::list_posts))
            .route("/posts", web::post().to(forum::create_post))
            .route("/posts/mine", web::get().to(forum::list_my_posts))
            .route("/posts/{pubkey}", web::get().to(forum::get_post))
            .route("/posts/{pubkey}", web::put().to(forum::update_post))
            .route("/posts/{pubkey}", web::delete().to(forum::delete_post)),
    );
}
