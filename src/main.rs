use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use forum_backend::config::AppConfig;
use forum_backend::create_pool;
use forum_backend::handlers;
use migration::{Migrator, MigratorTrait};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
    tracing::info!("Database ready");

    let serve_static = Path::new(&config.static_dir).is_dir();
    if !serve_static {
        tracing::info!("No static directory at {}, skipping /static", config.static_dir);
    }

    let bind_addr = config.bind_addr();
    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let mut app = App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .configure(handlers::init_routes);

        if serve_static {
            app = app.service(Files::new("/static", &config_data.static_dir));
        }
        app
    })
    .bind(&bind_addr)?
    .run()
    .await
}
