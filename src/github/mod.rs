mod client;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::model::repository::RepositoryReference;

pub use client::{GitHubContentClient, DEFAULT_ENDPOINT};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid GitHub endpoint {0}")]
    Endpoint(String),
}

/// A file as returned by a successful fetch.
///
/// Fields the response did not carry as strings are `None`; a directory
/// listing ends up with all of them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Option<String>,
    /// `base64` for regular files, `none` once a file is too large to inline.
    pub encoding: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Found(RemoteFile),
    NotFound,
    Failed(ApiError),
}

/// Create-or-replace request for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWrite {
    #[serde(skip)]
    pub path: String,
    pub message: String,
    /// Base64 encoded file content.
    pub content: String,
    /// Sha of the version being replaced, `None` when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Read and write access to repository file contents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn get_content(&self, repository: &RepositoryReference, path: &str) -> FetchOutcome;

    async fn put_content(
        &self,
        repository: &RepositoryReference,
        write: &FileWrite,
    ) -> Result<(), ApiError>;
}
