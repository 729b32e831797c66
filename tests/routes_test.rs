//! End-to-end route tests against a sea-orm mock connection.
//!
//! Each mock is loaded with exactly the result sets the route is expected to
//! query, in order.

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{App, test, web};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Value};
use serde_json::Value as Json;
use uuid::Uuid;

use forum_backend::auth::jwt::issue_pair;
use forum_backend::auth::password::hash_password;
use forum_backend::config::{AppConfig, JwtConfig};
use forum_backend::handlers::init_routes;
use forum_backend::models::{posts, users};
use forum_backend::pagination::PaginationConfig;

const SECRET: &str = "routes-test-secret-at-least-256-bits-long-xxxxxxxxxx";

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        port: 0,
        static_dir: "./static".to_string(),
        jwt: JwtConfig::new(SECRET),
        pagination: PaginationConfig::default(),
    }
}

fn user(id: i32, password_hash: &str) -> users::Model {
    users::Model {
        id,
        pubkey: Uuid::new_v4(),
        username: format!("user{id}"),
        password: password_hash.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        is_active: true,
        date_joined: chrono::Utc::now(),
        last_login: None,
    }
}

fn post(id: i32, author_id: i32) -> posts::Model {
    let now = chrono::Utc::now();
    posts::Model {
        id,
        pubkey: Uuid::new_v4(),
        title: format!("post {id}"),
        content: "hello".to_string(),
        created_at: now,
        updated_at: now,
        author_id,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn bearer(user_id: i32) -> (&'static str, String) {
    let pair = issue_pair(user_id, &app_config().jwt).unwrap();
    ("Authorization", format!("Bearer {}", pair.access_token))
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db))
                .app_data(web::Data::new(app_config()))
                .configure(init_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn forum_requires_a_token() {
    let app = app!(empty_db());

    let req = test::TestRequest::get().uri("/forum/posts").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid authentication credentials");
}

#[actix_web::test]
async fn refresh_token_cannot_authenticate() {
    let pair = issue_pair(1, &app_config().jwt).unwrap();
    let app = app!(empty_db());

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(("Authorization", format!("Bearer {}", pair.refresh_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_returns_profile_without_secrets() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["username"], "user1");
    assert!(body.get("password").is_none());
    assert!(body.get("id").is_none());
}

#[actix_web::test]
async fn deactivated_user_is_rejected() {
    let mut inactive = user(1, "hash");
    inactive.is_active = false;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[inactive]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn list_posts_returns_a_page_with_links() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .append_query_results([[count_row(3)]])
        .append_query_results([vec![post(3, 1), post(2, 2)]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/forum/posts?page=1&size=2")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["title"], "post 3");
    assert!(body["data"][0].get("id").is_none());
    assert_eq!(
        body["pages"],
        serde_json::json!({ "first": 1, "last": 2, "current": 1, "next": 2, "prev": null })
    );
}

#[actix_web::test]
async fn my_posts_past_the_end_is_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .append_query_results([[count_row(4)]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/forum/posts/mine?page=9")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["pages"]["current"], 9);
    assert_eq!(body["pages"]["last"], 1);
    assert_eq!(body["pages"]["next"], Json::Null);
    assert_eq!(body["pages"]["prev"], 1);
}

#[actix_web::test]
async fn oversized_page_is_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/forum/posts?size=1000")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Json = test::read_body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid page request")
    );
}

#[actix_web::test]
async fn non_numeric_page_gets_a_json_error() {
    for uri in ["/forum/posts?page=abc", "/forum/posts/mine?size=1.5"] {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user(1, "hash")]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(1))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Json = test::read_body_json(resp).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("invalid page request"),
            "{uri}: {body}"
        );
    }
}

#[actix_web::test]
async fn only_the_author_may_edit() {
    let someone_elses = post(5, 2);
    let pubkey = someone_elses.pubkey;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .append_query_results([[someone_elses]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::put()
        .uri(&format!("/forum/posts/{pubkey}"))
        .insert_header(bearer(1))
        .set_json(serde_json::json!({ "title": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_post_rejects_long_titles() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/forum/posts")
        .insert_header(bearer(1))
        .set_json(serde_json::json!({ "title": "x".repeat(101), "content": "body" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_rejects_blank_username() {
    let app = app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(serde_json::json!({ "username": " ", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_returns_a_token_pair() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(12, "hash")]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(serde_json::json!({
            "username": "user12",
            "password": "secret",
            "first_name": "Test",
            "last_name": "User",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
}

#[actix_web::test]
async fn register_database_failure_is_a_server_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(serde_json::json!({ "username": "user12", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Json = test::read_body_json(resp).await;
    assert_ne!(body["error"], "Cannot create user.");
}

#[actix_web::test]
async fn login_accepts_the_username_with_surrounding_whitespace() {
    let hash = hash_password("right-password").await.unwrap();
    let account = user(1, &hash);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[account.clone()]])
        .append_query_results([[account]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", " user1 "), ("password", "right-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn login_with_wrong_password_is_rejected() {
    let hash = hash_password("right-password").await.unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, &hash)]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "user1"), ("password", "wrong-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Incorrect username or password.");
}

#[actix_web::test]
async fn login_with_unknown_user_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "ghost"), ("password", "whatever")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_returns_a_token_pair() {
    let hash = hash_password("right-password").await.unwrap();
    let account = user(1, &hash);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[account.clone()]])
        .append_query_results([[account]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "user1"), ("password", "right-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
}

#[actix_web::test]
async fn refresh_endpoint_rejects_access_tokens() {
    let pair = issue_pair(1, &app_config().jwt).unwrap();
    let app = app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/token/refresh")
        .set_json(serde_json::json!({ "refresh": pair.access_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn refresh_endpoint_issues_a_new_pair() {
    let pair = issue_pair(1, &app_config().jwt).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user(1, "hash")]])
        .into_connection();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/token/refresh")
        .set_json(serde_json::json!({ "refresh": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Json = test::read_body_json(resp).await;
    assert_ne!(body["refresh_token"], Json::String(pair.refresh_token));
}
