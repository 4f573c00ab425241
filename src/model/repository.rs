use std::{
    fmt::{Display, Formatter},
    sync::OnceLock,
};

use regex_lite::Regex;
use url::Url;

use crate::model::ParseError;

const GITHUB_BASE_URL: &str = "https://github.com";
pub const DEFAULT_ORGANIZATION: &str = "The-Matrix-Labs";

/// A repository inside the allowed organization, as accepted from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub owner: String,
    pub repo: String,
}

impl Display for RepositoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Restricts repository urls to a single GitHub organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPolicy {
    organization: String,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ORGANIZATION)
    }
}

impl RepositoryPolicy {
    pub fn new(organization: impl Into<String>) -> Self {
        RepositoryPolicy {
            organization: organization.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Every accepted url starts with this exact string.
    pub fn prefix(&self) -> String {
        format!("{}/{}/", GITHUB_BASE_URL, self.organization)
    }

    /// Resolves `https://github.com/<organization>/<repo>` into a reference.
    ///
    /// The prefix check is done on the raw string first, then the url is
    /// parsed and its normalized path re-validated, so `..` segments or
    /// extra path components cannot escape the organization.
    pub fn parse(&self, url: &str) -> Result<RepositoryReference, ParseError> {
        let prefix = self.prefix();
        if !url.starts_with(&prefix) {
            return Err(ParseError::OutsideNamespace {
                url: url.to_string(),
                prefix,
            });
        }

        let parsed = Url::parse(url)?;
        if parsed.query().is_some() {
            return Err(ParseError::UnexpectedComponent("query", url.to_string()));
        }
        if parsed.fragment().is_some() {
            return Err(ParseError::UnexpectedComponent("fragment", url.to_string()));
        }

        let mut segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        if segments.last() == Some(&"") {
            segments.pop();
        }

        let (owner, repo) = match segments.as_slice() {
            [owner, repo] => (*owner, *repo),
            [] | [_] => {
                return Err(ParseError::MissingUrlComponent(
                    "repository".to_string(),
                    url.to_string(),
                ))
            }
            _ => return Err(ParseError::TrailingPath(url.to_string())),
        };

        if owner != self.organization {
            return Err(ParseError::ForeignOwner {
                owner: owner.to_string(),
                organization: self.organization.clone(),
            });
        }

        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return Err(ParseError::MissingUrlComponent(
                "repository".to_string(),
                url.to_string(),
            ));
        }
        if !is_valid_name(repo) {
            return Err(ParseError::InvalidName(repo.to_string()));
        }

        Ok(RepositoryReference {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let re = NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());
    re.is_match(name) && name != "." && name != ".."
}
