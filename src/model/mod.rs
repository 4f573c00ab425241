use thiserror::Error;

pub mod readme;
pub mod repository;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing repository url")]
    MissingUrl,
    #[error("Repository url `{url}` is outside of `{prefix}`")]
    OutsideNamespace { url: String, prefix: String },
    #[error("Malformed repository url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unexpected {0} in repository url `{1}`")]
    UnexpectedComponent(&'static str, String),
    #[error("Missing url component `{0}` in string `{1}`")]
    MissingUrlComponent(String, String),
    #[error("Too many path segments in repository url `{0}`")]
    TrailingPath(String),
    #[error("Owner `{owner}` does not belong to organization `{organization}`")]
    ForeignOwner { owner: String, organization: String },
    #[error("Invalid repository name `{0}`")]
    InvalidName(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContentError {
    #[error("README.md content not found")]
    MissingContent,
    #[error("README.md sha not found")]
    MissingSha,
    #[error("README.md content has unsupported encoding `{0}`")]
    UnsupportedEncoding(String),
    #[error("README.md content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}
