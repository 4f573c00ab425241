use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::model::ContentError;

pub const README_PATH: &str = "README.md";

/// Raw bytes of a README together with the sha it was read at.
///
/// `content_hash` is `None` for a README that does not exist yet. The bytes
/// are never re-encoded as text, so whatever was committed is written back
/// unchanged apart from the appended space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadmeContent {
    pub bytes: Vec<u8>,
    pub content_hash: Option<String>,
}

impl ReadmeContent {
    /// An empty README that has never been committed.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Decodes the base64 payload returned by the contents API.
    ///
    /// Line breaks and other ASCII whitespace inside the payload are ignored,
    /// the API wraps encoded content at 60 columns.
    pub fn from_encoded(encoded: &str, sha: impl Into<String>) -> Result<Self, ContentError> {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(ReadmeContent {
            bytes: STANDARD.decode(compact)?,
            content_hash: Some(sha.into()),
        })
    }

    /// Lossy text view of the content.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Appends a single space. Existing trailing whitespace is kept as is.
    pub fn append_space(&mut self) {
        self.bytes.push(b' ');
    }

    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
