use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use super::assets;
use crate::registry::RegistryError;
use crate::systemd::{ControlAction, ServiceStatus, SystemdManager};

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SystemdManager>,
    pub default_log_lines: u32,
}

#[derive(Clone)]
pub struct WebServer {
    pub port: u16,
    pub host: String,
    state: AppState,
}

impl WebServer {
    pub fn new(
        port: u16,
        host: String,
        manager: Arc<SystemdManager>,
        default_log_lines: u32,
    ) -> Self {
        Self {
            port,
            host,
            state: AppState {
                manager,
                default_log_lines,
            },
        }
    }

    pub async fn start(&self) -> Result<()> {
        let app = self.create_app();
        // Convert localhost to 127.0.0.1 for proper parsing
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            &self.host
        };
        let addr: SocketAddr = format!("{}:{}", host, self.port).parse()?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "web server ready and listening on http://{}:{}",
            self.host, self.port
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await?;

        Ok(())
    }

    fn create_app(&self) -> Router {
        Router::new()
            .route("/", get(serve_index))
            .route("/static/style.css", get(serve_css))
            .route("/static/app.js", get(serve_js))
            .route("/api/services", get(list_services))
            .route("/api/services/add", post(add_service))
            .route("/api/services/:name", delete(remove_service))
            .route("/api/services/:name/status", get(service_status))
            .route("/api/services/:name/start", post(start_service))
            .route("/api/services/:name/stop", post(stop_service))
            .route("/api/services/:name/restart", post(restart_service))
            .route("/api/services/:name/logs", get(service_logs))
            .with_state(self.state.clone())
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
    }
}

async fn serve_index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn serve_css() -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/css")
        .body(assets::STYLE_CSS.into())
        .unwrap()
}

async fn serve_js() -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "application/javascript")
        .body(assets::APP_JS.into())
        .unwrap()
}

async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceStatus>> {
    Json(state.manager.aggregate().await)
}

#[derive(Debug, Deserialize)]
pub struct AddServiceRequest {
    pub name: String,
    #[serde(default)]
    pub validate: bool,
}

async fn add_service(
    State(state): State<AppState>,
    Json(request): Json<AddServiceRequest>,
) -> Response {
    let registry = state.manager.registry();

    if request.validate {
        if let Err(err) = registry.validate(&request.name).await {
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    }

    match registry.add(&request.name).await {
        Ok(()) => (StatusCode::OK, "Service added successfully").into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn remove_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.manager.registry().remove(&name).await {
        Ok(()) => (StatusCode::OK, "Service removed successfully").into_response(),
        Err(err @ RegistryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn service_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceStatus>, (StatusCode, String)> {
    state.manager.query_status(&name).await.map(Json).map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to get service status: {err}"),
        )
    })
}

async fn start_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    control_service(state, ControlAction::Start, name).await
}

async fn stop_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    control_service(state, ControlAction::Stop, name).await
}

async fn restart_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    control_service(state, ControlAction::Restart, name).await
}

/// Control commands are fire-and-forget, so on success the status is
/// re-queried and returned for the UI to render.
async fn control_service(state: AppState, action: ControlAction, name: String) -> Response {
    if let Err(err) = state.manager.control(action, &name).await {
        error!("{err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to {action} service: {err}"),
        )
            .into_response();
    }

    match state.manager.query_status(&name).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to get service status: {err}"),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<u32>,
}

async fn service_logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let lines = query.lines.unwrap_or(state.default_log_lines);
    match state.manager.logs(&name, lines).await {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to get logs: {err}"),
        )
            .into_response(),
    }
}
