use actix::Actor;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use blog_posts::config::AppConfig;
use blog_posts::middleware::not_found::not_found;
use blog_posts::notification::hub::NotificationHub;
use blog_posts::post::post_service::PostService;
use blog_posts::router::index::routes;
use blog_posts::uploader::model::FileValidator;
use blog_posts::uploader::service::UploadService;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    info!(
        "Starting server on http://{}:{} (posts: {}, assets: {})",
        config.host,
        config.port,
        config.posts_file.display(),
        config.assets_dir.display()
    );

    let post_service = web::Data::new(PostService::new(config.posts_file.clone()));
    let upload_service = web::Data::new(UploadService::new(
        config.assets_dir.clone(),
        FileValidator::images().with_max_size(config.max_upload_size),
    ));
    let hub = web::Data::new(NotificationHub::new().start());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(post_service.clone())
            .app_data(upload_service.clone())
            .app_data(hub.clone())
            .configure(routes)
            .default_service(web::to(not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
