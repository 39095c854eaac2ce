use phone_price_tracker::{
    AppState, build_router, config::Config, services::data_loader::load_dataset,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,phone_price_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Phone Price Tracker API...");

    // Load data once; blocks until Athena answers or we fall back
    let dataset = load_dataset(&config).await;
    tracing::info!(
        "Loaded {} price records from {}",
        dataset.len(),
        dataset.source()
    );

    let app = build_router(AppState::new(dataset));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
