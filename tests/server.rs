mod common;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{http::StatusCode, Router};
use common::{get, touch_uri, Call, FakeGitHub};
use pretty_assertions::assert_eq;
use readme_upsert::{
    github::{ApiError, ContentApi, FetchOutcome, FileWrite},
    model::repository::RepositoryReference,
    ReadmeUpserter,
};

const REPO: &str = "The-Matrix-Labs/my-repo";
const REPO_URL: &str = "https://github.com/The-Matrix-Labs/my-repo";

fn caller(last: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last], 40000))
}

fn app(github: &Arc<FakeGitHub>) -> Router {
    ReadmeUpserter::builder()
        .content_api(github.clone())
        .try_build()
        .unwrap()
        .router()
}

#[tokio::test]
async fn update_existing_readme() {
    let github = FakeGitHub::new();
    let sha = github.seed(REPO, "hello");
    let app = app(&github);

    let (status, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "README updated successfully.");
    assert_eq!(github.readme(REPO).as_deref(), Some("hello "));
    assert_eq!(
        github.calls(),
        vec![
            Call::Get(REPO.to_string()),
            Call::Put {
                repository: REPO.to_string(),
                message: "Update README.md".to_string(),
                sha: Some(sha),
            },
        ]
    );
}

#[tokio::test]
async fn create_missing_readme() {
    let github = FakeGitHub::new();
    let app = app(&github);

    let (status, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "README created successfully.");
    assert_eq!(github.readme(REPO).as_deref(), Some(" "));
    assert_eq!(
        github.calls()[1],
        Call::Put {
            repository: REPO.to_string(),
            message: "Create README.md".to_string(),
            sha: None,
        }
    );
}

#[tokio::test]
async fn every_call_appends_another_space() {
    let github = FakeGitHub::new();
    github.seed(REPO, "x");
    let app = app(&github);

    get(&app, &touch_uri(REPO_URL), caller(1)).await;
    assert_eq!(github.readme(REPO).as_deref(), Some("x "));

    get(&app, &touch_uri(REPO_URL), caller(1)).await;
    assert_eq!(github.readme(REPO).as_deref(), Some("x  "));
}

#[tokio::test]
async fn create_then_update() {
    let github = FakeGitHub::new();
    let app = app(&github);

    let (_, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;
    assert_eq!(body, "README created successfully.");
    let (_, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;
    assert_eq!(body, "README updated successfully.");
    assert_eq!(github.readme(REPO).as_deref(), Some("  "));
}

#[tokio::test]
async fn reject_invalid_repository_urls() {
    let github = FakeGitHub::new();
    let app = app(&github);

    let uris = vec![
        "/".to_string(),
        "/?repoUrl=".to_string(),
        "/?repoUrl%5B%5D=https://github.com/The-Matrix-Labs/my-repo".to_string(),
        format!("{}&repoUrl=https://github.com/The-Matrix-Labs/other", touch_uri(REPO_URL)),
        touch_uri("https://github.com/other-org/my-repo"),
        touch_uri("https://github.com/The-Matrix-Labs/"),
        touch_uri("https://github.com/The-Matrix-Labs/my-repo/blob/main/README.md"),
        touch_uri("https://github.com/The-Matrix-Labs/../other-org/my-repo"),
    ];
    for uri in uris {
        let (status, body) = get(&app, &uri, caller(1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "Invalid repository URL.");
    }
    assert!(github.calls().is_empty());
}

#[tokio::test]
async fn write_conflict_is_a_server_error() {
    struct StaleReads(Arc<FakeGitHub>);

    #[async_trait::async_trait]
    impl ContentApi for StaleReads {
        async fn get_content(&self, repository: &RepositoryReference, path: &str) -> FetchOutcome {
            let outcome = self.0.get_content(repository, path).await;
            // someone else commits between our read and our write
            self.0.seed(&repository.to_string(), "edited elsewhere");
            outcome
        }

        async fn put_content(
            &self,
            repository: &RepositoryReference,
            write: &FileWrite,
        ) -> Result<(), ApiError> {
            self.0.put_content(repository, write).await
        }
    }

    let github = FakeGitHub::new();
    github.seed(REPO, "hello");
    let app = ReadmeUpserter::builder()
        .content_api(Arc::new(StaleReads(github.clone())))
        .try_build()
        .unwrap()
        .router();

    let (status, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error accessing GitHub API.");
    assert_eq!(github.readme(REPO).as_deref(), Some("edited elsewhere"));
}

#[tokio::test]
async fn rate_limit_per_caller() {
    let github = FakeGitHub::new();
    let app = ReadmeUpserter::builder()
        .content_api(github.clone())
        .rate_limit(Duration::from_secs(60), 10)
        .try_build()
        .unwrap()
        .router();

    for _ in 0..10 {
        let (status, _) = get(&app, "/", caller(1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = get(&app, &touch_uri(REPO_URL), caller(1)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, "Too many requests, please try again later.");
    assert!(github.calls().is_empty());

    let (status, _) = get(&app, &touch_uri(REPO_URL), caller(2)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_sets_retry_after() {
    use axum::{body::Body, extract::ConnectInfo, http::Request};
    use tower::ServiceExt;

    let github = FakeGitHub::new();
    let app = ReadmeUpserter::builder()
        .content_api(github)
        .rate_limit(Duration::from_secs(60), 1)
        .try_build()
        .unwrap()
        .router();

    get(&app, "/", caller(1)).await;

    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(caller(1)));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
}
