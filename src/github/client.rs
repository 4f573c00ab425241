use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::model::repository::RepositoryReference;

use super::{ApiError, ContentApi, FetchOutcome, FileWrite, RemoteFile};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Talks to the repository contents endpoints of the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubContentClient {
    http_client: Client,
    endpoint: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GitHubContentClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ApiError::Endpoint(e.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(ApiError::Endpoint(endpoint.to_string()));
        }
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn contents_url(&self, repository: &RepositoryReference, path: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Endpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                repository.owner.as_str(),
                repository.repo.as_str(),
                "contents",
            ])
            .extend(path.split('/'));
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn status_error(response: Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    async fn fetch(
        &self,
        repository: &RepositoryReference,
        path: &str,
    ) -> Result<FetchOutcome, ApiError> {
        let url = self.contents_url(repository, path)?;
        trace!("GET {}", url);

        let response = self.authorize(self.http_client.get(url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(FetchOutcome::NotFound),
            status if status.is_success() => {
                let body: serde_json::Value = response.json().await?;
                let field = |name: &str| {
                    body.get(name)
                        .and_then(|value| value.as_str())
                        .map(str::to_string)
                };
                Ok(FetchOutcome::Found(RemoteFile {
                    content: field("content"),
                    encoding: field("encoding"),
                    sha: field("sha"),
                }))
            }
            _ => Err(Self::status_error(response).await),
        }
    }
}

#[async_trait]
impl ContentApi for GitHubContentClient {
    async fn get_content(&self, repository: &RepositoryReference, path: &str) -> FetchOutcome {
        debug!("Fetching {} from {}", path, repository);
        self.fetch(repository, path)
            .await
            .unwrap_or_else(FetchOutcome::Failed)
    }

    async fn put_content(
        &self,
        repository: &RepositoryReference,
        write: &FileWrite,
    ) -> Result<(), ApiError> {
        let url = self.contents_url(repository, &write.path)?;
        debug!(
            "Writing {} to {} ({})",
            write.path,
            repository,
            if write.sha.is_some() { "update" } else { "create" }
        );
        trace!("PUT {}", url);

        let response = self
            .authorize(self.http_client.put(url))
            .json(write)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }
}
