use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skyview_proxy::{Relay, Settings, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    info!("Starting weather proxy with {:?}", settings);

    let relay = Relay::new(&settings);
    if !relay.has_key() {
        warn!("OPENWEATHER_KEY is not set; every request will fail with status 500");
    }

    info!("Listening on http://{}", settings.bind_address);
    warp::serve(routes::routes(relay))
        .run(settings.bind_address)
        .await;

    Ok(())
}
