#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use readme_upsert::{
    github::{ApiError, ContentApi, FetchOutcome, FileWrite, RemoteFile},
    model::repository::RepositoryReference,
};
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Put {
        repository: String,
        message: String,
        sha: Option<String>,
    },
}

struct StoredFile {
    text: String,
    sha: String,
}

/// In-memory stand-in for the contents API that enforces sha checks the way GitHub does.
#[derive(Default)]
pub struct FakeGitHub {
    files: Mutex<HashMap<String, StoredFile>>,
    calls: Mutex<Vec<Call>>,
    revision: Mutex<u32>,
}

impl FakeGitHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn key(repository: &RepositoryReference, path: &str) -> String {
        format!("{}/{}", repository, path)
    }

    fn next_sha(&self) -> String {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        format!("sha{}", revision)
    }

    pub fn seed(&self, repository: &str, text: &str) -> String {
        let sha = self.next_sha();
        self.files.lock().unwrap().insert(
            format!("{}/README.md", repository),
            StoredFile {
                text: text.to_string(),
                sha: sha.clone(),
            },
        );
        sha
    }

    pub fn readme(&self, repository: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&format!("{}/README.md", repository))
            .map(|file| file.text.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentApi for FakeGitHub {
    async fn get_content(&self, repository: &RepositoryReference, path: &str) -> FetchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Get(repository.to_string()));
        match self.files.lock().unwrap().get(&Self::key(repository, path)) {
            Some(file) => FetchOutcome::Found(RemoteFile {
                content: Some(format!("{}\n", STANDARD.encode(&file.text))),
                encoding: Some("base64".to_string()),
                sha: Some(file.sha.clone()),
            }),
            None => FetchOutcome::NotFound,
        }
    }

    async fn put_content(
        &self,
        repository: &RepositoryReference,
        write: &FileWrite,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::Put {
            repository: repository.to_string(),
            message: write.message.clone(),
            sha: write.sha.clone(),
        });

        let key = Self::key(repository, &write.path);
        let current = self
            .files
            .lock()
            .unwrap()
            .get(&key)
            .map(|file| file.sha.clone());
        if current != write.sha {
            return Err(ApiError::Status {
                status: 409,
                message: format!("{} does not match", write.path),
            });
        }

        let text = String::from_utf8(STANDARD.decode(&write.content).unwrap()).unwrap();
        let sha = self.next_sha();
        self.files
            .lock()
            .unwrap()
            .insert(key, StoredFile { text, sha });
        Ok(())
    }
}

pub fn touch_uri(repo_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(repo_url.as_bytes()).collect();
    format!("/?repoUrl={}", encoded)
}

/// Sends a GET through the router as if it came from `caller`.
pub async fn get(app: &Router, uri: &str, caller: SocketAddr) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(caller));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
