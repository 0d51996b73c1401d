//! HTTP surface: a hyper 1 server over the ingestion pipeline, the mapping
//! reconciler and the employee service.

pub mod handlers;
pub mod multipart;
pub mod response;
pub mod router;

use crate::config::RosterConfig;
use crate::employee::EmployeeService;
use crate::ingest::IngestPipeline;
use crate::mapping::MappingReconciler;
use crate::store::SharedStore;
use anyhow::Context;
use handlers::{parse_query, RequestContext};
use http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN,
};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::{Request, Response};
use response::{empty, json, problem, HttpResponse};
use router::{Route, RouteError};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Components shared by every request.
pub struct AppState {
    pub config: RosterConfig,
    pub pipeline: IngestPipeline<SharedStore>,
    pub mappings: MappingReconciler<SharedStore>,
    pub employees: EmployeeService<SharedStore>,
}

impl AppState {
    pub fn new(config: RosterConfig, store: SharedStore) -> Self {
        let upload_dir = config.storage.upload_dir.as_ref().map(PathBuf::from);
        Self {
            pipeline: IngestPipeline::new(store.clone(), config.ingest.clone())
                .with_upload_dir(upload_dir),
            mappings: MappingReconciler::new(store.clone()),
            employees: EmployeeService::new(store, config.ingest.rules.clone()),
            config,
        }
    }
}

pub struct RosterServer {
    state: Arc<AppState>,
}

impl RosterServer {
    pub fn new(config: RosterConfig, store: SharedStore) -> Self {
        Self { state: Arc::new(AppState::new(config, store)) }
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.state.config.server.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        self.serve_with_listener(listener).await
    }

    pub async fn serve_with_listener(self, listener: TcpListener) -> anyhow::Result<()> {
        log::info!("Roster server listening on http://{}", listener.local_addr()?);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let state = self.state.clone();

            tokio::spawn(async move {
                let io = hyper_util::rt::TokioIo::new(stream);
                let service = hyper::service::service_fn(move |req| {
                    let state = state.clone();
                    async move {
                        Ok::<_, Infallible>(handle_request(state, req, remote_addr).await)
                    }
                });

                if let Err(err) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    log::error!("Connection error from {}: {}", remote_addr, err);
                }
            });
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
    remote: SocketAddr,
) -> HttpResponse {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = req.headers().get(ORIGIN).cloned();

    let mut response = if method == Method::OPTIONS && state.config.server.cors_enabled {
        empty(StatusCode::NO_CONTENT)
    } else {
        route(&state, req).await
    };

    if state.config.server.cors_enabled {
        apply_cors(&state.config.server.cors_origins, origin.as_ref(), &mut response);
    }
    log_access(remote, method.as_str(), &path, &response, start);
    response
}

async fn route(state: &AppState, req: Request<Incoming>) -> HttpResponse {
    let server = &state.config.server;
    let path = req.uri().path().to_string();

    let route = match router::resolve(req.method(), &path) {
        Ok(route) => route,
        Err(RouteError::NotFound) => {
            return json(StatusCode::NOT_FOUND, &json!({"success": false, "error": "Not found"}));
        }
        Err(RouteError::MethodNotAllowed) => {
            let body = json!({"success": false, "error": "Method not allowed"});
            return json(StatusCode::METHOD_NOT_ALLOWED, &body);
        }
    };

    let query = parse_query(req.uri().query());
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match Limited::new(req.into_body(), server.max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            log::warn!("Rejected body for {}: {}", path, e);
            return json(
                StatusCode::PAYLOAD_TOO_LARGE,
                &json!({
                    "success": false,
                    "error": format!("Request body exceeds {} bytes", server.max_body_size),
                }),
            );
        }
    };
    let ctx = RequestContext { path: path.clone(), query, content_type, body };

    let result = match route {
        Route::Health => Ok(json(StatusCode::OK, &json!({"status": "ok"}))),
        Route::Upload => handlers::excel::upload(state, ctx).await,
        Route::ListMappings => handlers::mapping::list(state).await,
        Route::UpdateMapping => handlers::mapping::update(state, ctx).await,
        Route::ListEmployees => handlers::employee::list(state, ctx).await,
        Route::CreateEmployee => handlers::employee::create(state, ctx).await,
        Route::SearchEmployees => handlers::employee::search(state, ctx).await,
        Route::GetEmployee(id) => handlers::employee::get(state, &id).await,
        Route::UpdateEmployee(id) => handlers::employee::update(state, &id, ctx).await,
        Route::DeleteEmployee(id) => handlers::employee::delete(state, &id).await,
    };

    result.unwrap_or_else(|error| problem(&error, &server.error_type_base, &path))
}

fn apply_cors(origins: &[String], origin: Option<&HeaderValue>, response: &mut HttpResponse) {
    let allowed = if origins.iter().any(|o| o == "*") {
        Some(HeaderValue::from_static("*"))
    } else {
        origin.filter(|o| o.to_str().is_ok_and(|o| origins.iter().any(|a| a == o))).cloned()
    };
    let Some(allowed) = allowed else {
        return;
    };
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allowed);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

/// One JSON access line per request.
fn log_access<B>(remote: SocketAddr, method: &str, path: &str, resp: &Response<B>, start: Instant) {
    log::info!(
        "{}",
        json!({
            "remote": remote.ip().to_string(),
            "method": method,
            "path": path,
            "status": resp.status().as_u16(),
            "dur_ms": start.elapsed().as_millis() as u64,
        })
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respond() -> HttpResponse {
        empty(StatusCode::OK)
    }

    #[test]
    fn test_cors_wildcard() {
        let mut resp = respond();
        apply_cors(&["*".to_string()], None, &mut resp);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_cors_echoes_listed_origin_only() {
        let origins = vec!["https://hr.example.com".to_string()];

        let mut listed = respond();
        let hr = HeaderValue::from_static("https://hr.example.com");
        apply_cors(&origins, Some(&hr), &mut listed);
        assert_eq!(listed.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://hr.example.com");

        let mut other = respond();
        let evil = HeaderValue::from_static("https://evil.example.com");
        apply_cors(&origins, Some(&evil), &mut other);
        assert!(other.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
