use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use donation_portal::{database::connection, routes::api, settings::Settings};
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env().context("Failed to load settings")?;
    let pool = connection::init_pool(&settings.database_url)
        .await
        .context("Failed to initialize database pool")?;

    let host = settings.host.clone();
    let port = settings.port;
    info!("Starting donation portal on {}:{}", host, port);

    let pool = web::Data::new(pool);
    let settings = web::Data::new(settings);

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(settings.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(api::scoped_config)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
