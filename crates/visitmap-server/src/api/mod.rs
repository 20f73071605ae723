mod views;

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{Mutex, RwLock},
    task::AbortHandle,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use visitmap_geocode::NominatimClient;
use visitmap_route::{GeoJsonFactory, GeoJsonSurface, Resolver, RouteView};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

/// Upper bound on concurrently mounted views.
pub const DEFAULT_MAX_VIEWS: usize = 1024;

/// One mounted view and the background pass currently resolving for it.
pub(crate) struct MountedView {
    pub route: RouteView<GeoJsonFactory>,
    in_flight: Option<AbortHandle>,
}

impl MountedView {
    /// Stops the running pass, if any, so it makes no further lookups.
    pub fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    pub fn track(&mut self, handle: AbortHandle) {
        self.cancel_in_flight();
        self.in_flight = Some(handle);
    }

    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn teardown(&mut self) {
        self.cancel_in_flight();
        self.route.teardown();
    }
}

pub(crate) type SharedView = Arc<Mutex<MountedView>>;

/// Mounted route views keyed by the caller-chosen view id.
#[derive(Clone)]
pub struct AppState {
    views: Arc<RwLock<HashMap<String, SharedView>>>,
    resolver: Arc<Resolver<Arc<NominatimClient>>>,
    padding_px: u32,
    max_views: usize,
}

impl AppState {
    pub fn new(resolver: Resolver<Arc<NominatimClient>>, padding_px: u32) -> Self {
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
            resolver: Arc::new(resolver),
            padding_px,
            max_views: DEFAULT_MAX_VIEWS,
        }
    }

    #[must_use]
    pub fn with_max_views(mut self, max_views: usize) -> Self {
        self.max_views = max_views;
        self
    }

    async fn view(&self, view_id: &str) -> Option<SharedView> {
        self.views.read().await.get(view_id).cloned()
    }

    /// Returns the view, mounting it first if needed. `None` when a new view
    /// would exceed `max_views`.
    async fn mount_view(&self, view_id: &str) -> Option<SharedView> {
        let mut views = self.views.write().await;
        if let Some(view) = views.get(view_id) {
            return Some(Arc::clone(view));
        }
        if views.len() >= self.max_views {
            tracing::warn!(view_id, max_views = self.max_views, "view limit reached");
            return None;
        }

        let id = view_id.to_owned();
        let route = RouteView::new(GeoJsonSurface::factory(), self.padding_px)
            .with_resolved_count_callback(Box::new(move |mapped: usize, attempted: usize| {
                tracing::info!(view_id = %id, mapped, attempted, "route view updated");
            }));
        let view = Arc::new(Mutex::new(MountedView {
            route,
            in_flight: None,
        }));
        views.insert(view_id.to_owned(), Arc::clone(&view));
        tracing::debug!(view_id, "mounted route view");
        Some(view)
    }

    async fn unmount_view(&self, view_id: &str) -> Option<SharedView> {
        self.views.write().await.remove(view_id)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    mounted_views: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "capacity_exceeded" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/views/{view_id}",
            get(views::get_view).delete(views::delete_view),
        )
        .route("/api/v1/views/{view_id}/visits", put(views::put_visits))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let mounted_views = state.views.read().await.len();
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            mounted_views,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
