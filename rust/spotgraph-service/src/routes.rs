use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, info_span};

use spotgraph_core::naming::LabelTable;
use spotgraph_core::source::load_bundle;
use spotgraph_core::MapIdent;

use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Healthz {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CellsResponse {
    pub map_id: String,
    pub map: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NotationsResponse {
    pub map_id: String,
    pub notations: LabelTable,
}

#[derive(Debug, Deserialize)]
pub struct CellUpdate {
    pub label: String,
    /// Renumber every later cell from this one.
    #[serde(default, rename = "continue")]
    pub continue_sequence: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/version", get(version))
        .route("/maps/:map_id/cells", get(cells))
        .route("/maps/:map_id/notations", get(notations).put(replace_notations))
        .route("/maps/:map_id/notations/:cell", put(update_cell))
        .route("/maps/:map_id/autofill", post(autofill))
        .route("/notations/save", post(save))
        .route("/notations/reload", post(reload))
        .with_state(state)
}

fn parse_map_id(map_id: &str) -> Result<MapIdent, AppError> {
    MapIdent::from_notation_key(map_id)
        .ok_or_else(|| AppError::BadRequest(format!("map id must be world * 10 + map, got {map_id:?}")))
}

fn map_cells(state: &AppState, ident: &MapIdent) -> Result<Vec<String>, AppError> {
    let bundle = load_bundle(&*state.source, ident, state.secret_threshold)?
        .ok_or_else(|| AppError::NotFound(format!("map {ident} has no documents")))?;
    Ok(bundle.cells())
}

fn notations_response(map_id: String, notations: LabelTable) -> Json<NotationsResponse> {
    Json(NotationsResponse { map_id, notations })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(Healthz { status: "ok" }))
}

async fn version() -> impl IntoResponse {
    let svc_version = env!("CARGO_PKG_VERSION");
    let core_version = spotgraph_core::version();
    (StatusCode::OK, Json(json!({"service_version": svc_version, "core_version": core_version})))
}

async fn cells(State(state): State<AppState>, Path(map_id): Path<String>) -> Result<Json<CellsResponse>, AppError> {
    let ident = parse_map_id(&map_id)?;
    let cells = map_cells(&state, &ident)?;
    Ok(Json(CellsResponse { map_id, map: ident.to_string(), cells }))
}

async fn notations(State(state): State<AppState>, Path(map_id): Path<String>) -> Result<Json<NotationsResponse>, AppError> {
    parse_map_id(&map_id)?;
    let table = state.store.table(&map_id).unwrap_or_default();
    Ok(notations_response(map_id, table))
}

async fn replace_notations(
    State(state): State<AppState>,
    Path(map_id): Path<String>,
    Json(table): Json<LabelTable>,
) -> Result<Json<NotationsResponse>, AppError> {
    let span = info_span!("replace_notations", map_id = %map_id);
    let _enter = span.enter();
    parse_map_id(&map_id)?;
    let table = state.store.replace(&map_id, table);
    info!(cells = table.len(), "notations replaced");
    Ok(notations_response(map_id, table))
}

async fn update_cell(
    State(state): State<AppState>,
    Path((map_id, cell)): Path<(String, String)>,
    Json(req): Json<CellUpdate>,
) -> Result<Json<NotationsResponse>, AppError> {
    let span = info_span!("update_cell", map_id = %map_id, cell = %cell);
    let _enter = span.enter();
    let ident = parse_map_id(&map_id)?;
    if req.label.trim().is_empty() {
        return Err(AppError::BadRequest("label must not be empty".into()));
    }
    let cells = map_cells(&state, &ident)?;
    if !cells.contains(&cell) {
        return Err(AppError::NotFound(format!("cell {cell} is not a spot of map {ident}")));
    }
    let table = state.store.update_one(&map_id, &cells, &cell, req.label.trim(), req.continue_sequence);
    info!(continue_sequence = req.continue_sequence, "cell updated");
    Ok(notations_response(map_id, table))
}

async fn autofill(State(state): State<AppState>, Path(map_id): Path<String>) -> Result<Json<NotationsResponse>, AppError> {
    let span = info_span!("autofill", map_id = %map_id);
    let _enter = span.enter();
    let ident = parse_map_id(&map_id)?;
    let cells = map_cells(&state, &ident)?;
    let table = state.store.autofill(&map_id, &cells);
    info!(cells = table.len(), "autofilled");
    Ok(notations_response(map_id, table))
}

async fn save(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let maps = state.store.save()?;
    Ok((StatusCode::OK, Json(json!({"saved": true, "maps": maps, "path": state.store.path().display().to_string()}))))
}

async fn reload(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    match state.store.reload()? {
        Some(maps) => Ok((StatusCode::OK, Json(json!({"reloaded": true, "maps": maps})))),
        None => Err(AppError::NotFound(format!("{} does not exist", state.store.path().display()))),
    }
}
