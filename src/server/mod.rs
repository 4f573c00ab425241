pub mod rate_limit;

use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::info;

use crate::upsert::{ReadmeHandler, UpsertError, UpsertOutcome};

use self::rate_limit::{rate_limit_middleware, RateLimiter};

const REPO_URL_PARAM: &str = "repoUrl";

impl IntoResponse for UpsertOutcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.message()).into_response()
    }
}

impl UpsertError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpsertError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            UpsertError::MalformedResponse { .. } | UpsertError::Remote { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UpsertError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}

/// `GET /?repoUrl=...`
///
/// The parameter counts as missing unless it is given exactly once.
async fn touch_readme(
    State(handler): State<ReadmeHandler>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<UpsertOutcome, UpsertError> {
    let mut values = params
        .iter()
        .filter(|(name, _)| name == REPO_URL_PARAM)
        .map(|(_, value)| value.as_str());
    let repo_url = match (values.next(), values.next()) {
        (Some(url), None) => Some(url),
        _ => None,
    };
    handler.handle(repo_url).await
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

/// Builds the service. The rate limit applies before any other processing.
pub fn router(handler: ReadmeHandler, limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/", get(touch_readme))
        .with_state(handler)
        .layer(middleware::from_fn(move |req, next| {
            rate_limit_middleware(Arc::clone(&limiter), req, next)
        }))
        .layer(middleware::from_fn(log_requests))
}

/// Serves `app` on `addr` until Ctrl-C is received.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
