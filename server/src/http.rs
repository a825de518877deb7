//! axum transport: turns every incoming request into an [`ApiRequest`],
//! dispatches it, and falls back to static files for non-API targets.

use crate::api::{self, ApiRequest, ApiResponse, ApiRouter, Endpoint};
use crate::logging;
use crate::static_files::StaticFiles;
use axum::body::{self, Body};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Largest request body read into memory.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    router: Arc<ApiRouter>,
    files: Arc<StaticFiles>,
}

impl AppState {
    pub fn new(router: ApiRouter, files: StaticFiles) -> Self {
        Self {
            router: Arc::new(router),
            files: Arc::new(files),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Application with a single catch-all handler; routing is done by
/// [`ApiRouter`] so dispatch order stays explicit.
pub fn app(state: AppState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

async fn handle(State(state): State<AppState>, request: Request) -> Response {
    let started = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let (parts, incoming) = request.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
    logging::request_received(&peer, &target, parts.method.as_str());

    let response = match body::to_bytes(incoming, MAX_BODY_BYTES).await {
        Ok(bytes) => {
            let request = ApiRequest {
                method: parts.method,
                target,
                headers: parts.headers,
                body: bytes.to_vec(),
            };
            let dispatched = state.router.dispatch(&request).await;
            match dispatched {
                Some(response) => response.into_response(),
                None => {
                    state
                        .files
                        .serve(request.method, &request.target, request.headers)
                        .await
                }
            }
        }
        Err(err) => {
            logging::transport_error(0, &err.to_string(), "read");
            if Endpoint::resolve(parts.uri.path()).is_some() {
                api::unreadable_body().into_response()
            } else {
                ApiResponse::text(StatusCode::BAD_REQUEST, "Failed to read request body")
                    .into_response()
            }
        }
    };

    let elapsed = started.elapsed().as_millis() as u64;
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("null");
    logging::response_sent(elapsed, response.status().as_u16(), content_type);
    response
}

/// Serves `state` on `listener` until `shutdown` resolves, then lets
/// in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
