use std::{
    error::Error,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use log::warn;

use crate::{
    config::ReadmeUpsertConfig,
    github::{ContentApi, GitHubContentClient, DEFAULT_ENDPOINT},
    model::repository::RepositoryPolicy,
    server::rate_limit::RateLimitSettings,
    upsert::ReadmeHandler,
    ReadmeUpserter,
};

#[derive(Default)]
pub struct ReadmeUpserterBuilder {
    token: Option<String>,
    github_endpoint: Option<String>,
    organization: Option<String>,
    listen: Option<SocketAddr>,
    rate_limit: Option<RateLimitSettings>,
    content_api: Option<Arc<dyn ContentApi>>,
}

impl ReadmeUpserterBuilder {
    /// Starts from a loaded configuration; later calls override its values.
    pub fn from_config(config: ReadmeUpsertConfig) -> Self {
        Self {
            token: config.token,
            github_endpoint: Some(config.endpoint),
            organization: Some(config.organization),
            listen: Some(config.listen),
            rate_limit: Some(config.rate_limit),
            content_api: None,
        }
    }

    /// Token used to authenticate against the GitHub API.
    ///
    /// Without one only public reads work and every write fails.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base url of the GitHub REST API.
    ///
    /// Defaults to `https://api.github.com`.
    pub fn github_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.github_endpoint = Some(endpoint.into());
        self
    }

    /// The only organization whose repositories are accepted.
    ///
    /// Defaults to `The-Matrix-Labs`.
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Defaults to `0.0.0.0:3000`.
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.listen = Some(addr);
        self
    }

    pub fn host(mut self, host: IpAddr) -> Self {
        let port = self.listen_or_default().port();
        self.listen = Some(SocketAddr::new(host, port));
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        let mut listen = self.listen_or_default();
        listen.set_port(port);
        self.listen = Some(listen);
        self
    }

    /// Defaults to 10 requests per 60 seconds per caller.
    pub fn rate_limit(mut self, window: Duration, max_requests: u32) -> Self {
        self.rate_limit = Some(RateLimitSettings {
            window,
            max_requests,
        });
        self
    }

    /// Replaces the GitHub client, token and endpoint are ignored then.
    pub fn content_api(mut self, api: Arc<dyn ContentApi>) -> Self {
        self.content_api = Some(api);
        self
    }

    fn listen_or_default(&self) -> SocketAddr {
        self.listen
            .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000))
    }

    pub fn try_build(self) -> Result<ReadmeUpserter, Box<dyn Error>> {
        let listen = self.listen_or_default();
        let Self {
            token,
            github_endpoint,
            organization,
            listen: _,
            rate_limit,
            content_api,
        } = self;

        let api = match content_api {
            Some(api) => api,
            None => {
                if token.is_none() {
                    warn!("No GitHub token configured, README writes will be rejected");
                }
                let endpoint = github_endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
                Arc::new(GitHubContentClient::new(&endpoint, token)?)
            }
        };

        let policy = organization
            .map(RepositoryPolicy::new)
            .unwrap_or_default();

        Ok(ReadmeUpserter {
            handler: ReadmeHandler::new(api, policy),
            listen,
            rate_limit: rate_limit.unwrap_or_default(),
        })
    }
}
