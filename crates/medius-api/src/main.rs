use medius_api::config::ApiConfig;
use medius_api::setup;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env if present, then the environment.
    dotenvy::dotenv().ok();

    setup::telemetry::init_telemetry();

    let config = ApiConfig::from_env()?;

    let (_state, router) = setup::initialize_app(&config).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
