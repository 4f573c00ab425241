use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    github::{ApiError, ContentApi, FetchOutcome, FileWrite, RemoteFile},
    model::{
        readme::{ReadmeContent, README_PATH},
        repository::{RepositoryPolicy, RepositoryReference},
        ContentError, ParseError,
    },
};

const UPDATE_MESSAGE: &str = "Update README.md";
const CREATE_MESSAGE: &str = "Create README.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing README got one more trailing space.
    Updated,
    /// The repository had no README, one containing a single space was committed.
    Created,
}

impl UpsertOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            UpsertOutcome::Updated => "README updated successfully.",
            UpsertOutcome::Created => "README created successfully.",
        }
    }
}

#[derive(Error, Debug)]
pub enum UpsertError {
    #[error("Invalid repository url: {0}")]
    InvalidInput(#[from] ParseError),
    #[error("Unexpected README.md payload for {repository}: {source}")]
    MalformedResponse {
        repository: RepositoryReference,
        source: ContentError,
    },
    #[error("GitHub request for {repository} failed: {source}")]
    Remote {
        repository: RepositoryReference,
        source: ApiError,
    },
}

impl UpsertError {
    /// The only detail a caller ever gets to see.
    pub fn public_message(&self) -> &'static str {
        match self {
            UpsertError::InvalidInput(_) => "Invalid repository URL.",
            UpsertError::MalformedResponse { .. } | UpsertError::Remote { .. } => {
                "Error accessing GitHub API."
            }
        }
    }
}

/// Appends a space to the README of a repository, creating it when missing.
///
/// Every successful call grows the file by one byte; calls are not
/// idempotent.
#[derive(Clone)]
pub struct ReadmeHandler {
    api: Arc<dyn ContentApi>,
    policy: RepositoryPolicy,
}

impl ReadmeHandler {
    pub fn new(api: Arc<dyn ContentApi>, policy: RepositoryPolicy) -> Self {
        ReadmeHandler { api, policy }
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        &self.policy
    }

    pub async fn handle(&self, repo_url: Option<&str>) -> Result<UpsertOutcome, UpsertError> {
        let parsed = match repo_url {
            Some(url) => self.policy.parse(url),
            None => Err(ParseError::MissingUrl),
        };
        let repository = match parsed {
            Ok(repository) => repository,
            Err(e) => {
                debug!("Rejected request: {}", e);
                return Err(e.into());
            }
        };

        let outcome = match self.api.get_content(&repository, README_PATH).await {
            FetchOutcome::Found(file) => self.update(&repository, file).await?,
            FetchOutcome::NotFound => {
                debug!("{} has no {}, creating it", repository, README_PATH);
                self.create(&repository).await?
            }
            FetchOutcome::Failed(source) => {
                let error = UpsertError::Remote { repository, source };
                warn!("{}", error);
                return Err(error);
            }
        };

        info!("{} {}", repository, outcome.message());
        Ok(outcome)
    }

    async fn update(
        &self,
        repository: &RepositoryReference,
        file: RemoteFile,
    ) -> Result<UpsertOutcome, UpsertError> {
        let mut readme = Self::decode(file).map_err(|source| {
            let error = UpsertError::MalformedResponse {
                repository: repository.clone(),
                source,
            };
            warn!("{}", error);
            error
        })?;
        debug!("{} {} is {} bytes", repository, README_PATH, readme.len());
        readme.append_space();
        self.write(repository, UPDATE_MESSAGE, readme).await?;
        Ok(UpsertOutcome::Updated)
    }

    async fn create(&self, repository: &RepositoryReference) -> Result<UpsertOutcome, UpsertError> {
        let mut readme = ReadmeContent::absent();
        readme.append_space();
        self.write(repository, CREATE_MESSAGE, readme).await?;
        Ok(UpsertOutcome::Created)
    }

    fn decode(file: RemoteFile) -> Result<ReadmeContent, ContentError> {
        match file.encoding.as_deref() {
            None | Some("base64") => {}
            Some(other) => return Err(ContentError::UnsupportedEncoding(other.to_string())),
        }
        let content = file.content.ok_or(ContentError::MissingContent)?;
        let sha = file.sha.ok_or(ContentError::MissingSha)?;
        ReadmeContent::from_encoded(&content, sha)
    }

    async fn write(
        &self,
        repository: &RepositoryReference,
        message: &str,
        readme: ReadmeContent,
    ) -> Result<(), UpsertError> {
        let write = FileWrite {
            path: README_PATH.to_string(),
            message: message.to_string(),
            content: readme.encoded(),
            sha: readme.content_hash,
        };
        self.api
            .put_content(repository, &write)
            .await
            .map_err(|source| {
                let error = UpsertError::Remote {
                    repository: repository.clone(),
                    source,
                };
                warn!("{}", error);
                error
            })
    }
}
