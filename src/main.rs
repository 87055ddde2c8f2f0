//! Process entry point: load configuration, connect the database, build
//! the engine, and serve the HTTP facade.

use std::sync::Arc;

use discharge_core::Config;
use discharge_scrape::ChromeFetcher;
use discharge_web::AppState;
use discharge_workflow::Engine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "discharge_coordinator=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(bind = %config.http_bind_addr, demo_mode = config.demo_mode, "starting discharge coordinator");

    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database connection established and migrations applied");

    let fetcher = Arc::new(ChromeFetcher::new(config.proxy_url.clone()));
    let bind_addr = config.http_bind_addr.clone();
    let engine = Arc::new(Engine::build(config, pool, fetcher));

    let app = discharge_web::router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
