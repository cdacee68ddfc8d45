//! HTTP server for the fare engine.
//!
//! Reads the tariff directory from `FARE_ENGINE_CONFIG` and the listen
//! address from `FARE_ENGINE_ADDR`.

use std::env;
use std::error::Error;

use fare_engine::api::{AppState, create_router};
use fare_engine::config::ConfigLoader;
use tracing::info;

const DEFAULT_CONFIG_DIR: &str = "./config/standard";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let config_dir = env::var("FARE_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = env::var("FARE_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        tariff = %config.tariff().code,
        version = %config.tariff().version,
        "Tariff loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Fare engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}
