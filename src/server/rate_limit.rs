use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::debug;
use tokio::{sync::Mutex, time::Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: u32 = 10;
const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        RateLimitSettings {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Rejected, the caller may retry once `retry_after` has elapsed.
    Limited { retry_after: Duration },
}

struct Window {
    started: Instant,
    hits: u32,
}

/// Fixed window request counter, one window per caller.
pub struct RateLimiter {
    settings: RateLimitSettings,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        RateLimiter {
            settings,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> RateLimitSettings {
        self.settings
    }

    pub async fn check(&self, caller: &str) -> Admission {
        let now = Instant::now();
        let window_length = self.settings.window;
        let mut windows = self.windows.lock().await;

        windows.retain(|_, window| now.duration_since(window.started) < window_length);

        let window = windows.entry(caller.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if window.hits < self.settings.max_requests {
            window.hits += 1;
            Admission::Allowed
        } else {
            Admission::Limited {
                retry_after: window_length.saturating_sub(now.duration_since(window.started)),
            }
        }
    }
}

fn caller_identity(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects callers that went over their budget before the request reaches a handler.
pub async fn rate_limit_middleware(limiter: Arc<RateLimiter>, req: Request, next: Next) -> Response {
    let caller = caller_identity(&req);
    match limiter.check(&caller).await {
        Admission::Allowed => next.run(req).await,
        Admission::Limited { retry_after } => {
            debug!("Rate limited {}", caller);
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            let mut response = (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            response
        }
    }
}
