use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    github::DEFAULT_ENDPOINT,
    model::repository::DEFAULT_ORGANIZATION,
    server::rate_limit::{RateLimitSettings, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW},
};

const DEFAULT_PORT: u16 = 3000;

pub struct ReadmeUpsertConfig {
    pub listen: SocketAddr,
    pub token: Option<String>,
    pub endpoint: String,
    pub organization: String,
    pub rate_limit: RateLimitSettings,
}

impl ReadmeUpsertConfig {
    /// Reads the optional config file, then `README_UPSERT_*` environment variables.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(file, None)?;
        raw_config.try_into()
    }
}

impl TryFrom<RawConfig> for ReadmeUpsertConfig {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> anyhow::Result<Self> {
        if raw.limit.window == Some(0) {
            anyhow::bail!("Rate limit window must be at least one second");
        }
        let host = raw.server.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = raw.server.port.unwrap_or(DEFAULT_PORT);
        Ok(Self {
            listen: SocketAddr::new(host, port),
            token: raw.github.token.filter(|token| !token.is_empty()),
            endpoint: raw
                .github
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            organization: raw
                .github
                .organization
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            rate_limit: RateLimitSettings {
                window: raw
                    .limit
                    .window
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_WINDOW),
                max_requests: raw.limit.requests.unwrap_or(DEFAULT_MAX_REQUESTS),
            },
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    github: GitHubConfig,
    #[serde(default)]
    limit: LimitConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct ServerConfig {
    host: Option<IpAddr>,
    port: Option<u16>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GitHubConfig {
    token: Option<String>,
    endpoint: Option<String>,
    organization: Option<String>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct LimitConfig {
    /// Window length in seconds.
    window: Option<u64>,
    requests: Option<u32>,
}

impl RawConfig {
    fn load(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(true));
        }
        builder
            .add_source(
                Environment::with_prefix("README_UPSERT")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
