use mealroute::config::Config;
use mealroute::engine::Engine;
use mealroute::error::Error;
use mealroute::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let engine = Engine::from_config(&config).await?;

    serve(engine, config.bind_addr).await
}
