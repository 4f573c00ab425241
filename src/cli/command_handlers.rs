use std::{error::Error, net::SocketAddr, sync::Arc};

use log::info;

use crate::{
    server::{
        self,
        rate_limit::{RateLimitSettings, RateLimiter},
    },
    upsert::{ReadmeHandler, UpsertError, UpsertOutcome},
};

/// Handler to serve command
pub async fn do_serve(
    handler: &ReadmeHandler,
    listen: SocketAddr,
    rate_limit: RateLimitSettings,
) -> Result<(), Box<dyn Error>> {
    info!(
        "Accepting repositories under {}, at most {} requests per {}s per caller",
        handler.policy().prefix(),
        rate_limit.max_requests,
        rate_limit.window.as_secs()
    );
    let limiter = Arc::new(RateLimiter::new(rate_limit));
    server::serve(listen, server::router(handler.clone(), limiter)).await?;
    Ok(())
}

/// Handler to touch command
pub async fn do_touch(
    handler: &ReadmeHandler,
    repo_url: &str,
) -> Result<UpsertOutcome, UpsertError> {
    handler.handle(Some(repo_url)).await
}
