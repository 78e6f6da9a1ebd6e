//! Content retrieval error types.

use thiserror::Error;

/// Errors that can occur while fetching a file from a repository.
#[derive(Debug, Error)]
pub enum ContentsError {
    /// The remote reported that the file does not exist.
    #[error("404 ERROR: file '{file}' not found in '{repository}'")]
    NotFound { file: String, repository: String },

    /// The path resolved to a directory rather than a single file.
    #[error("'{file}' is not a file path")]
    NotAFile { file: String },

    /// The request was rate limited after the internal retry was spent.
    #[error("Rate limit exceeded while fetching '{file}' from '{repository}'")]
    RateLimited { file: String, repository: String },

    /// GitHub's abuse detection fired; the caller must stop issuing requests.
    #[error("Abuse detected while fetching from '{repository}': {message}")]
    AbuseDetected { repository: String, message: String },

    /// The repository identifier did not split into owner and name.
    #[error("Invalid repository identifier '{repository}'; expected owner/name")]
    InvalidRepository { repository: String },

    /// The file item carried no decodable content.
    #[error("File '{file}' in '{repository}' has no decodable content")]
    EmptyContent { file: String, repository: String },

    /// Any other GitHub API error, passed through unchanged.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),
}

impl ContentsError {
    /// True when the whole batch must stop issuing requests, not just this
    /// repository.
    #[must_use]
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::AbuseDetected { .. })
    }
}
