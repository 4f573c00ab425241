use std::{error::Error, net::SocketAddr, sync::Arc};

use axum::Router;

use crate::{
    cli::command_handlers::{do_serve, do_touch},
    server::{
        self,
        rate_limit::{RateLimitSettings, RateLimiter},
    },
    upsert::{ReadmeHandler, UpsertError, UpsertOutcome},
};

mod builder;

pub use builder::ReadmeUpserterBuilder;

pub struct ReadmeUpserter {
    handler: ReadmeHandler,
    listen: SocketAddr,
    rate_limit: RateLimitSettings,
}

impl ReadmeUpserter {
    pub fn builder() -> ReadmeUpserterBuilder {
        ReadmeUpserterBuilder::default()
    }

    pub fn handler(&self) -> &ReadmeHandler {
        &self.handler
    }

    /// Address `serve` binds to.
    pub fn listen_address(&self) -> SocketAddr {
        self.listen
    }

    /// The HTTP service with a fresh rate limiter, ready to be served or tested.
    pub fn router(&self) -> Router {
        server::router(
            self.handler.clone(),
            Arc::new(RateLimiter::new(self.rate_limit)),
        )
    }

    /// Appends a space to the README of a single repository
    pub async fn touch(&self, repo_url: &str) -> Result<UpsertOutcome, UpsertError> {
        do_touch(&self.handler, repo_url).await
    }

    /// Serves the README endpoint until interrupted
    pub async fn serve(&self) -> Result<(), Box<dyn Error>> {
        do_serve(&self.handler, self.listen, self.rate_limit).await
    }
}
