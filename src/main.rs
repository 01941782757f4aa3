use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{debug, info};
use trivia::{config::Config, database::Database, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::load()?;
    init_logger(&config)?;
    info!("Starting with {:?}", config);

    let database = Database::from_config(&config)
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors())
            .data(database.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .bind(&config.bind)
    .with_context(|| format!("Failed to bind {}", config.bind))?
    .run()
    .await?;

    info!("Server shut down");
    Ok(())
}

// Set up logging //
////////////////////

fn init_logger(config: &Config) -> anyhow::Result<()> {
    use simplelog::*;

    CombinedLogger::init(vec![TermLogger::new(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Failed to install logger")?;

    debug!("Logger successfully initialized");
    Ok(())
}
