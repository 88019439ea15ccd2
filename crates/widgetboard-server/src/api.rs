//! REST routes for widget management.
//!
//! ## Endpoints
//!
//! All routes live under `/api/v1/widgets`:
//! ```text
//! POST   /add?x&y&width&height[&zIndex]   create, 201 + Location
//! GET    /{guid}                          fetch one
//! PUT    /{guid}?[x][&y][&width][&height][&zIndex]
//! DELETE /{guid}                          always 200 for a well-formed guid
//! GET    /                                guids in stacking order
//! GET    /limit?[limit][&offset]          one page of widgets
//! GET    /filter?x1&y1&x2&y2              widgets overlapping a region
//! ```
//! Collection endpoints answer 204 when there is nothing to return.

use crate::config::ServerConfig;
use crate::dto::WidgetDto;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use widgetboard_core::{LayoutPatch, Widget, WidgetError, WidgetId, WidgetStore};

const WIDGETS_PATH: &str = "/api/v1/widgets";

/// Shared application state.
pub struct AppState {
    pub store: WidgetStore,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: WidgetStore::new(),
            config,
        }
    }
}

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] WidgetError),
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Request failed: {}", self);
        match self {
            ApiError::Store(WidgetError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Widget not found").into_response()
            }
            other => (StatusCode::BAD_REQUEST, other.to_string()).into_response(),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Query parameters for widget creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub z_index: Option<i64>,
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Query parameters for region filtering: two opposite corners.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterParams {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(WIDGETS_PATH, get(list_widgets))
        .route("/api/v1/widgets/", get(list_widgets))
        .route("/api/v1/widgets/add", post(create_widget))
        .route("/api/v1/widgets/limit", get(page_widgets))
        .route("/api/v1/widgets/filter", get(filter_widgets))
        .route(
            "/api/v1/widgets/{guid}",
            get(get_widget).put(update_widget).delete(delete_widget),
        )
        .with_state(state)
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

pub async fn create_widget(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateParams>,
) -> ApiResult<Response> {
    let widget = state.store.create(
        params.x,
        params.y,
        params.width,
        params.height,
        params.z_index,
    )?;
    info!("Created widget {} at zIndex {}", widget.id(), widget.z_index());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, widget_location(widget.id()))],
        Json(WidgetDto::from(&widget)),
    )
        .into_response())
}

pub async fn get_widget(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
) -> ApiResult<Json<WidgetDto>> {
    let widget = state.store.get(parse_guid(&guid)?)?;
    Ok(Json(WidgetDto::from(&widget)))
}

pub async fn update_widget(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
    Query(patch): Query<LayoutPatch>,
) -> ApiResult<Response> {
    let id = parse_guid(&guid)?;
    state.store.update(id, &patch)?;

    Ok((StatusCode::OK, [(header::LOCATION, widget_location(id))]).into_response())
}

pub async fn delete_widget(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_guid(&guid)?;
    match state.store.remove(id) {
        Ok(()) => info!("Deleted widget {}", id),
        // Deleting something already gone still succeeds
        Err(WidgetError::NotFound(_)) => debug!("Delete of unknown widget {}", id),
        Err(err) => return Err(err.into()),
    }
    Ok(StatusCode::OK)
}

pub async fn list_widgets(State(state): State<Arc<AppState>>) -> Response {
    let guids: Vec<WidgetId> = state.store.list().iter().map(Widget::id).collect();
    if guids.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(guids).into_response()
    }
}

pub async fn page_widgets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    let (limit, offset) = page_bounds(&params, &state.config)?;
    Ok(widgets_response(state.store.page(limit, offset)))
}

pub async fn filter_widgets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Response> {
    let widgets = state
        .store
        .filter(params.x1, params.y1, params.x2, params.y2)?;
    Ok(widgets_response(widgets))
}

fn widgets_response(widgets: Vec<Widget>) -> Response {
    if widgets.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let body: Vec<WidgetDto> = widgets.iter().map(WidgetDto::from).collect();
    Json(body).into_response()
}

fn widget_location(id: WidgetId) -> String {
    format!("{}/{}", WIDGETS_PATH, id)
}

fn parse_guid(raw: &str) -> ApiResult<WidgetId> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::BadRequest("The 'guid' parameter has wrong format".to_string()))
}

fn page_bounds(params: &PageParams, config: &ServerConfig) -> ApiResult<(usize, usize)> {
    let limit = match params.limit {
        None => config.page_limit,
        Some(limit) if limit < 0 => {
            return Err(ApiError::BadRequest("The 'limit' can't be negative".to_string()));
        }
        Some(limit) => usize::try_from(limit)
            .ok()
            .filter(|&limit| limit <= config.max_page_limit)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "The 'limit' parameter more than {}",
                    config.max_page_limit
                ))
            })?,
    };
    let offset = match params.offset {
        None => 0,
        Some(offset) => usize::try_from(offset)
            .map_err(|_| ApiError::BadRequest("The 'offset' can't be negative".to_string()))?,
    };
    Ok((limit, offset))
}
