//! REST API routes

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use f1i_core::model::{DriverColor, EventId, Lap, LapTelemetry, RawSample, SessionKey, SessionKind};
use f1i_core::normalize::add_distance;
use f1i_core::stats::LapStatistics;
use f1i_core::{analyze, select, CompareOptions, ComparisonResult, LapSelection, SessionProvider};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

const DEFAULT_DRIVER1_COLOR: &str = "#FF0000";
const DEFAULT_DRIVER2_COLOR: &str = "#0000FF";

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/api/v1/drivers/session/:year/:event/:session",
            get(session_drivers),
        )
        .route(
            "/api/v1/telemetry/laps/:year/:event/:session/:driver",
            get(driver_laps),
        )
        .route(
            "/api/v1/telemetry/fastest-lap/:year/:event/:session/:driver",
            get(fastest_lap),
        )
        .route(
            "/api/v1/telemetry/track-dominance/:year/:event/:session",
            get(track_dominance),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

// === Service Endpoints ===

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the F1 Insight API" }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "F1 Insight API is running",
        "provider": state.provider.name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// === Request parsing ===

fn session_key(year: &str, event: &str, session: &str) -> Result<SessionKey, ApiError> {
    let year = year
        .trim()
        .parse::<u16>()
        .map_err(|_| ApiError::BadRequest(format!("invalid season year '{}'", year)))?;
    let event: EventId = event.parse()?;
    let session: SessionKind = session.parse()?;
    Ok(SessionKey::new(year, event, session))
}

fn driver_code(value: Option<&str>, name: &str) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(code) if !code.is_empty() => Ok(code.to_uppercase()),
        _ => Err(ApiError::BadRequest(format!("{} is required", name))),
    }
}

/// Run a blocking provider call off the async runtime
async fn blocking<T, F>(provider: &Arc<dyn SessionProvider>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn SessionProvider) -> Result<T, ApiError> + Send + 'static,
{
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || f(provider.as_ref())).await?
}

fn fetch_laps(
    provider: &dyn SessionProvider,
    session: &SessionKey,
    driver: &str,
) -> Result<Vec<Lap>, ApiError> {
    let laps = provider.laps(session, driver)?;
    if laps.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No laps found for driver {} in {}",
            driver, session
        )));
    }
    Ok(laps)
}

// === Driver Endpoints ===

#[derive(Serialize)]
struct SessionDriver {
    driver_abbreviation: String,
}

async fn session_drivers(
    State(state): State<AppState>,
    Path((year, event, session)): Path<(String, String, String)>,
) -> Result<Json<Vec<SessionDriver>>, ApiError> {
    let key = session_key(&year, &event, &session)?;
    info!("Listing drivers in {}", key);

    let drivers = blocking(&state.provider, move |provider| {
        let drivers = provider.drivers(&key)?;
        if drivers.is_empty() {
            return Err(ApiError::NotFound(format!("No drivers found for session {}", key)));
        }
        Ok(drivers)
    })
    .await?;

    Ok(Json(
        drivers
            .into_iter()
            .map(|driver_abbreviation| SessionDriver {
                driver_abbreviation,
            })
            .collect(),
    ))
}

// === Lap Endpoints ===

#[derive(Serialize)]
struct LapsResponse {
    driver: String,
    session: String,
    laps: Vec<Lap>,
}

async fn driver_laps(
    State(state): State<AppState>,
    Path((year, event, session, driver)): Path<(String, String, String, String)>,
) -> Result<Json<LapsResponse>, ApiError> {
    let key = session_key(&year, &event, &session)?;
    let driver = driver_code(Some(&driver), "driver")?;
    info!("Listing laps for {} in {}", driver, key);

    let session = key.to_string();
    let laps = blocking(&state.provider, {
        let driver = driver.clone();
        move |provider| fetch_laps(provider, &key, &driver)
    })
    .await?;

    Ok(Json(LapsResponse {
        driver,
        session,
        laps,
    }))
}

#[derive(Serialize)]
struct FastestLapResponse {
    driver: String,
    lap_number: u32,
    lap_time: Option<f64>,
    telemetry_points: Vec<RawSample>,
    #[serde(flatten)]
    statistics: LapStatistics,
}

async fn fastest_lap(
    State(state): State<AppState>,
    Path((year, event, session, driver)): Path<(String, String, String, String)>,
) -> Result<Json<FastestLapResponse>, ApiError> {
    let key = session_key(&year, &event, &session)?;
    let driver = driver_code(Some(&driver), "driver")?;
    info!("Fetching fastest lap for {} in {}", driver, key);

    let response = blocking(&state.provider, move |provider| {
        let laps = fetch_laps(provider, &key, &driver)?;
        let lap = select(&driver, &laps, LapSelection::Fastest)?;
        let raw = provider.telemetry(&key, lap)?;
        let telemetry = add_distance(lap, &raw)?;

        // Report the distance channel the comparison would use
        let telemetry_points = raw
            .iter()
            .zip(&telemetry.samples)
            .map(|(sample, indexed)| RawSample {
                distance: Some(indexed.distance),
                ..sample.clone()
            })
            .collect();

        Ok(FastestLapResponse {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            lap_time: lap.valid_lap_time(),
            statistics: LapStatistics::from_samples(&raw),
            telemetry_points,
        })
    })
    .await?;

    Ok(Json(response))
}

// === Track Dominance Endpoint ===

#[derive(Debug, Default, Deserialize)]
struct DominanceQuery {
    driver1: Option<String>,
    driver2: Option<String>,
    lap1_identifier: Option<String>,
    lap2_identifier: Option<String>,
    driver1_color: Option<String>,
    driver2_color: Option<String>,
    segments: Option<String>,
}

#[derive(Debug)]
struct DominanceRequest {
    driver1: String,
    driver2: String,
    lap1: LapSelection,
    lap2: LapSelection,
    driver1_color: DriverColor,
    driver2_color: DriverColor,
    segments: usize,
}

impl DominanceQuery {
    fn validate(self, default_segments: usize) -> Result<DominanceRequest, ApiError> {
        let lap = |value: Option<String>| -> Result<LapSelection, ApiError> {
            Ok(value
                .as_deref()
                .map(str::parse::<LapSelection>)
                .transpose()?
                .unwrap_or_default())
        };
        let color = |value: Option<String>, default: &str| -> Result<DriverColor, ApiError> {
            Ok(value.as_deref().unwrap_or(default).parse::<DriverColor>()?)
        };

        let segments = match self.segments.as_deref().map(str::trim) {
            None => default_segments,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ApiError::BadRequest(format!(
                        "segments must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
        };

        Ok(DominanceRequest {
            driver1: driver_code(self.driver1.as_deref(), "driver1")?,
            driver2: driver_code(self.driver2.as_deref(), "driver2")?,
            lap1: lap(self.lap1_identifier)?,
            lap2: lap(self.lap2_identifier)?,
            driver1_color: color(self.driver1_color, DEFAULT_DRIVER1_COLOR)?,
            driver2_color: color(self.driver2_color, DEFAULT_DRIVER2_COLOR)?,
            segments,
        })
    }
}

async fn load_lap(
    provider: &Arc<dyn SessionProvider>,
    session: SessionKey,
    driver: String,
    selection: LapSelection,
) -> Result<LapTelemetry, ApiError> {
    blocking(provider, move |provider| {
        let laps = fetch_laps(provider, &session, &driver)?;
        let lap = select(&driver, &laps, selection)?;
        let raw = provider.telemetry(&session, lap)?;
        Ok(add_distance(lap, &raw)?)
    })
    .await
}

async fn track_dominance(
    State(state): State<AppState>,
    Path((year, event, session)): Path<(String, String, String)>,
    Query(query): Query<DominanceQuery>,
) -> Result<Json<ComparisonResult>, ApiError> {
    let key = session_key(&year, &event, &session)?;
    let request = query.validate(state.config.compare.segment_count)?;
    info!(
        "Track dominance {} ({}) vs {} ({}) in {}, {} segments",
        request.driver1, request.lap1, request.driver2, request.lap2, key, request.segments
    );

    let (reference, other) = tokio::try_join!(
        load_lap(&state.provider, key.clone(), request.driver1.clone(), request.lap1),
        load_lap(&state.provider, key, request.driver2.clone(), request.lap2),
    )?;

    let options = CompareOptions {
        segment_count: request.segments,
        viewport: state.config.compare.viewport,
    };
    let dominance = analyze(&reference, &other, &options)?;

    Ok(Json(dominance.into_result(
        request.driver1_color,
        request.driver2_color,
        &reference,
        &other,
    )))
}
