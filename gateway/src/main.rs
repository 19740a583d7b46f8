use anyhow::{Context, Result};
use site_scorer::{loader, ProximityRadii, SiteScorer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

pub use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "siting_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = PathBuf::from(std::env::var("SITING_DATA_DIR").unwrap_or_else(|_| "data".into()));
    let catalog = loader::load_catalog(
        data_dir.join("renewable_sources.json"),
        data_dir.join("demand_centers.json"),
    )
    .with_context(|| format!("loading catalog from {}", data_dir.display()))?;

    let deterministic = std::env::var("SITING_DETERMINISTIC")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    tracing::info!(
        "   Catalog: {} renewable sources, {} demand centers",
        catalog.renewables.len(),
        catalog.demand_centers.len()
    );
    if deterministic {
        tracing::info!("   Metric jitter disabled");
    }

    let state = AppState {
        catalog: Arc::new(catalog),
        scorer: Arc::new(SiteScorer::default()),
        radii: ProximityRadii::default(),
        deterministic,
    };

    let app = routes::router(state);

    let port = std::env::var("SITING_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "18700".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Siting gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
