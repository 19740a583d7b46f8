use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use site_scorer::loader::{DemandCenter, InfrastructureCatalog, RenewableSource};
use site_scorer::proximity::nearby_infrastructure;
use site_scorer::ranking::{rank_sites, CandidateSite, RankingResult};
use site_scorer::{
    Coordinate, DecimalValue, JitterSource, NoJitter, ProximityRadii, SeededJitter, SiteAnalysis,
    SiteScorer, SitingError,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<InfrastructureCatalog>,
    pub scorer: Arc<SiteScorer>,
    pub radii: ProximityRadii,
    /// Skip metric jitter so identical requests get identical answers
    pub deterministic: bool,
}

impl AppState {
    fn jitter(&self) -> Box<dyn JitterSource> {
        if self.deterministic {
            Box::new(NoJitter)
        } else {
            Box::new(SeededJitter::from_entropy())
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

fn api_error(err: SitingError) -> ApiError {
    if err.is_validation() {
        bad_request(err.to_string())
    } else {
        tracing::error!("Site analysis failed: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                message: "could not analyze this location".to_string(),
            }),
        )
    }
}

/// Malformed or wrongly-typed bodies are caller errors
fn rejected(rejection: JsonRejection) -> ApiError {
    bad_request(rejection.body_text())
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub latitude: Option<DecimalValue>,
    pub longitude: Option<DecimalValue>,
}

#[derive(Deserialize)]
pub struct RankRequest {
    pub sites: Vec<CandidateSite>,
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/analyze-site", post(analyze_site))
        .route("/rank-sites", post(rank))
        .route("/renewable-sources", get(list_renewable_sources))
        .route("/demand-centers", get(list_demand_centers))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "siting-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "renewable_sources": state.catalog.renewables.len(),
        "demand_centers": state.catalog.demand_centers.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Score one coordinate against the catalog
pub async fn analyze_site(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<SiteAnalysis>, ApiError> {
    let Json(req) = payload.map_err(rejected)?;
    let (Some(lat), Some(lon)) = (&req.latitude, &req.longitude) else {
        return Err(bad_request("Latitude and longitude are required"));
    };
    let candidate = Coordinate::from_values(lat, lon).map_err(api_error)?;

    let nearby = nearby_infrastructure(&state.catalog, &candidate, &state.radii);
    let analysis = state
        .scorer
        .analyze(
            &candidate,
            &nearby.renewable_signals(),
            &nearby.demand_signals(),
            state.jitter().as_mut(),
        )
        .map_err(api_error)?;

    tracing::debug!(
        "Analyzed {}: score {}",
        candidate,
        analysis.suitability_score
    );

    Ok(Json(analysis))
}

/// Rank a batch of named sites
pub async fn rank(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<RankingResult>, ApiError> {
    let Json(req) = payload.map_err(rejected)?;
    let result = rank_sites(
        &state.catalog,
        &req.sites,
        state.scorer.as_ref(),
        &state.radii,
        state.jitter().as_mut(),
    )
    .map_err(api_error)?;

    Ok(Json(result))
}

pub async fn list_renewable_sources(State(state): State<AppState>) -> Json<Vec<RenewableSource>> {
    Json(state.catalog.renewables.clone())
}

pub async fn list_demand_centers(State(state): State<AppState>) -> Json<Vec<DemandCenter>> {
    Json(state.catalog.demand_centers.clone())
}
