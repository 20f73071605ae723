use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use visitmap_core::Visit;
use visitmap_route::{GeoJsonFactory, PassOutcome, RouteView, ViewState};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_VIEW_ID_LEN: usize = 64;

#[derive(Debug, Deserialize)]
pub(super) struct ReplaceVisitsRequest {
    pub visits: Vec<Visit>,
}

#[derive(Debug, Serialize)]
pub(super) struct PassAccepted {
    pub view_id: String,
    pub generation: u64,
    pub attempted: usize,
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct FailureItem {
    pub visit_id: i64,
    pub input_index: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ViewSnapshot {
    pub view_id: String,
    pub generation: u64,
    pub state: &'static str,
    pub mapped: usize,
    pub attempted: usize,
    pub segments: usize,
    pub summary: Option<String>,
    pub failures: Vec<FailureItem>,
    /// GeoJSON `FeatureCollection`; present only once a route is drawn.
    pub route: Option<serde_json::Value>,
}

impl ViewSnapshot {
    fn capture(view_id: &str, view: &RouteView<GeoJsonFactory>) -> Self {
        let (state, mapped, attempted, segments) = match view.state() {
            ViewState::Idle => ("idle", 0, 0, 0),
            ViewState::Loading { .. } => ("loading", 0, 0, 0),
            ViewState::Empty { attempted } => ("empty", 0, attempted, 0),
            ViewState::Ready {
                mapped,
                attempted,
                segments,
            } => ("ready", mapped, attempted, segments),
        };

        let settled = matches!(view.state(), ViewState::Empty { .. } | ViewState::Ready { .. });
        let failures = if settled {
            view.failures()
                .iter()
                .map(|f| FailureItem {
                    visit_id: f.visit_id,
                    input_index: f.input_index,
                    reason: f.reason.to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let route = if matches!(view.state(), ViewState::Ready { .. }) {
            view.presenter()
                .surface()
                .map(visitmap_route::GeoJsonSurface::to_feature_collection)
        } else {
            None
        };

        Self {
            view_id: view_id.to_owned(),
            generation: view.generation(),
            state,
            mapped,
            attempted,
            segments,
            summary: settled.then(|| format!("{mapped} of {attempted} mapped")),
            failures,
            route,
        }
    }
}

fn validate_view_id(req_id: &str, view_id: &str) -> Result<(), ApiError> {
    let well_formed = !view_id.is_empty()
        && view_id.len() <= MAX_VIEW_ID_LEN
        && view_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if well_formed {
        Ok(())
    } else {
        Err(ApiError::new(
            req_id,
            "bad_request",
            format!("view id must be 1-{MAX_VIEW_ID_LEN} characters of [A-Za-z0-9_-]"),
        ))
    }
}

/// Replaces a view's visit list and starts a new pass in the background.
///
/// Any pass still running for the view is aborted, so it makes no further
/// geocoder lookups and its result is never applied.
pub(super) async fn put_visits(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(view_id): Path<String>,
    Json(body): Json<ReplaceVisitsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PassAccepted>>), ApiError> {
    validate_view_id(&req_id.0, &view_id)?;
    visitmap_core::validate_visits(&body.visits)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let view = state.mount_view(&view_id).await.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "capacity_exceeded",
            "too many mounted views; delete one first",
        )
    })?;
    let attempted = body.visits.len();

    let mut mounted = view.lock().await;
    mounted.cancel_in_flight();
    let ticket = mounted.route.begin_pass();

    let resolver = std::sync::Arc::clone(&state.resolver);
    let task_view = std::sync::Arc::clone(&view);
    let task_view_id = view_id.clone();
    let task = tokio::spawn(async move {
        let report = resolver.resolve(&body.visits).await;
        let mut mounted = task_view.lock().await;
        match mounted.route.complete_pass(ticket, report) {
            PassOutcome::Applied(_) => mounted.finish(),
            PassOutcome::Discarded {
                generation,
                current,
            } => {
                tracing::debug!(
                    view_id = %task_view_id,
                    generation,
                    current,
                    "superseded route pass dropped"
                );
            }
        }
    });
    // Registered under the lock, so the task cannot finish before it is tracked.
    mounted.track(task.abort_handle());
    drop(mounted);

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: PassAccepted {
                view_id,
                generation: ticket.generation(),
                attempted,
                state: "loading",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(view_id): Path<String>,
) -> Result<Json<ApiResponse<ViewSnapshot>>, ApiError> {
    let view = state.view(&view_id).await.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("view {view_id} not found"),
        )
    })?;

    let snapshot = ViewSnapshot::capture(&view_id, &view.lock().await.route);

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Unmounts a view: its surface is destroyed and any running pass is aborted.
pub(super) async fn delete_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(view_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let view = state.unmount_view(&view_id).await.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("view {view_id} not found"),
        )
    })?;

    view.lock().await.teardown();
    tracing::debug!(view_id = %view_id, "unmounted route view");
    Ok(StatusCode::NO_CONTENT)
}
