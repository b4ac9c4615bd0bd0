use class_pulse::api::{self, ApiContext};
use class_pulse::config;
use class_pulse::random::{RandomSource, StdRandomSource};
use class_pulse::store;
use std::net::SocketAddr;
use std::sync::Arc;

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "class-pulse starting"
    );
    let config = config::load_default()?;

    let random: Box<dyn RandomSource> = match config.simulation_seed() {
        Some(seed) => {
            tracing::info!(seed = seed, "Simulation seeded from config");
            Box::new(StdRandomSource::seeded(seed))
        }
        None => Box::new(StdRandomSource::from_entropy()),
    };

    let context = Arc::new(ApiContext::new(store::shared(), random));

    let app = api::router(Arc::clone(&context));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
