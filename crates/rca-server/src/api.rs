//! API handlers for the server.

use crate::session::{Session, SessionManager, SessionStats};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rca_core::{
    AutomatonParams, Error, Lattice, RenderConfig, RuleSpec, ServerConfig, SessionId,
    SimulationConfig,
};
use rca_engine::{render_png, Raster, RunSummary, Simulation};
use rca_rules::{Preset, PresetInfo, RuleTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Largest table the template endpoint will spell out key by key
const MAX_TEMPLATE_ENTRIES: usize = 65_536;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(get_config))
        .route("/api/stats", get(get_stats))
        .route("/api/presets", get(list_presets))
        .route("/api/rules/template", post(rule_template))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/run", post(run))
        .route("/api/sessions/:id/clear", post(clear))
        .route("/api/sessions/:id/history", get(history))
        .route("/api/sessions/:id/image.png", get(image))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run `f` against one session on the blocking pool.
///
/// Waiting for a busy session or rendering a large history never holds up
/// the async workers.
async fn on_session<R, F>(state: &AppState, id: SessionId, f: F) -> Result<R, ApiError>
where
    R: Send + 'static,
    F: FnOnce(&mut Session) -> rca_core::Result<R> + Send + 'static,
{
    let sessions = state.sessions.clone();
    let result = tokio::task::spawn_blocking(move || sessions.with_session(id, f))
        .await
        .map_err(|e| ApiError::Internal(format!("session task failed: {}", e)))?;
    Ok(result?)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
pub struct ConfigResponse {
    defaults: SimulationConfig,
    render: RenderConfig,
    max_steps: usize,
    max_size: usize,
    max_history_len: usize,
    max_states: u32,
}

/// Default run parameters and the service limits
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        defaults: SimulationConfig::default(),
        render: RenderConfig::default(),
        max_steps: state.config.max_steps,
        max_size: state.config.max_size,
        max_history_len: state.config.max_history_len,
        max_states: rca_core::MAX_STATES,
    })
}

/// Session counters
pub async fn get_stats(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.sessions.stats())
}

pub async fn list_presets() -> Json<Vec<PresetInfo>> {
    Json(Preset::catalogue())
}

/// The all-zero table for a geometry, ready to be edited into a custom rule
#[instrument]
pub async fn rule_template(
    Json(params): Json<AutomatonParams>,
) -> Result<Json<RuleTable>, ApiError> {
    params.validate()?;
    let len = params.table_len()?;
    if len > MAX_TEMPLATE_ENTRIES {
        return Err(ApiError::BadRequest(format!(
            "{} has {} neighborhoods; templates are limited to {}",
            params, len, MAX_TEMPLATE_ENTRIES
        )));
    }
    Ok(Json(RuleTable::new(params)?))
}

#[derive(Serialize)]
pub struct SessionResponse {
    session_id: SessionId,
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_id = state.sessions.create()?;
    info!("Session created: {}", session_id);
    Ok((StatusCode::CREATED, Json(SessionResponse { session_id })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(SessionId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(flatten)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub initial_state: Option<Lattice>,
    #[serde(default)]
    pub rule: RuleSpec,
}

#[derive(Serialize)]
pub struct RunResponse {
    session_id: SessionId,
    summary: RunSummary,
    /// History index of the first row in `raster`
    first_row: usize,
    /// Rows appended by this run
    raster: Raster,
}

/// Evolve the session's history by `steps` more states
#[instrument(skip(state, req), fields(session_id = %id))]
pub async fn run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let session_id = SessionId(id);
    let sim_config = &req.simulation;
    if sim_config.steps > state.config.max_steps {
        return Err(ApiError::BadRequest(format!(
            "steps {} exceeds the limit of {}",
            sim_config.steps, state.config.max_steps
        )));
    }
    if sim_config.size > state.config.max_size {
        return Err(ApiError::BadRequest(format!(
            "size {} exceeds the limit of {}",
            sim_config.size, state.config.max_size
        )));
    }

    let simulation = Simulation::from_config(sim_config, &req.rule)?;
    let initial = req
        .initial_state
        .unwrap_or_else(|| Lattice::single_seed(sim_config.size, 1));
    let steps = sim_config.steps;
    let states = sim_config.states;
    let max_history_len = state.config.max_history_len;

    let (summary, first_row, raster) = on_session(&state, session_id, move |session| {
        let first_row = session.history.len();
        let added = steps + usize::from(session.history.is_empty());
        if first_row + added > max_history_len {
            return Err(Error::InvalidState(format!(
                "history holds {} states; {} more would exceed the limit of {}",
                first_row, added, max_history_len
            )));
        }

        let summary = simulation.run(&mut session.history, &initial, steps)?;
        session.states = states;
        session.runs += 1;
        Ok((summary, first_row, session.history.raster_since(first_row)))
    })
    .await?;

    state.sessions.record_run();

    Ok(Json(RunResponse {
        session_id,
        summary,
        first_row,
        raster,
    }))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    on_session(&state, SessionId(id), |session| {
        session.history.clear();
        Ok(())
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct HistoryResponse {
    session_id: SessionId,
    created_at: DateTime<Utc>,
    runs: u64,
    states: u32,
    length: usize,
    raster: Raster,
}

pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_id = SessionId(id);
    let response = on_session(&state, session_id, move |session| {
        Ok(HistoryResponse {
            session_id,
            created_at: session.created_at,
            runs: session.runs,
            states: session.states,
            length: session.history.len(),
            raster: session.history.raster(),
        })
    })
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    cell_pixels: Option<u32>,
    invert: Option<bool>,
}

/// PNG rendering of the session's history
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let defaults = RenderConfig::default();
    let render = RenderConfig {
        cell_pixels: query.cell_pixels.unwrap_or(defaults.cell_pixels),
        invert: query.invert.unwrap_or(defaults.invert),
        ..defaults
    };

    let bytes = on_session(&state, SessionId(id), move |session| {
        render_png(&session.history.raster(), session.states, &render)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

// Error handling
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "rule_incomplete", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::RuleIncomplete { .. } => {
                warn!("Rule incomplete: {}", err);
                ApiError::Unprocessable(err.to_string())
            }
            Error::InvalidParameter(_) | Error::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            Error::NotFound(_) => ApiError::NotFound(err.to_string()),
            Error::InvalidState(_) => ApiError::Conflict(err.to_string()),
            _ => {
                error!("Core error: {}", err);
                ApiError::Internal(err.to_string())
            }
        }
    }
}
