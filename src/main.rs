//! Storefront API server

use anyhow::Result;
use storefront::{repo, router, AppState, Config, EventPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    storefront::init_tracing();

    let config = Config::from_env()?;
    let db = repo::connect(&config).await?;
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let app = router(AppState::new(db, events, &config));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, currency = %config.currency, "storefront listening");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
