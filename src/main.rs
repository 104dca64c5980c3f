use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use image_vault::api;
use image_vault::app_state::AppState;
use image_vault::config::AppConfig;

fn init_logging(config: &AppConfig) {
    if let Err(e) = log4rs::init_file(&config.logging.config_file, Default::default()) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        warn!(
            "Could not load log config {}: {}. Logging to stderr.",
            config.logging.config_file.display(),
            e
        );
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config);

    let state = match AppState::from_config(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let bind = (config.server.host.clone(), config.server.port);
    let max_payload = config.server.max_payload_size;
    info!("Starting server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::default().limit(max_payload))
            .configure(api::configure)
    })
    .workers(config.server.workers)
    .bind(bind)?
    .run()
    .await
}
