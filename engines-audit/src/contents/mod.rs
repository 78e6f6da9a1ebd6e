//! File content retrieval from GitHub repositories.
//!
//! Thin wrapper around the contents endpoint: splits an `owner/name`
//! identifier, fetches the configured file, detects directory paths, and
//! decodes the base64 body to UTF-8 text. A primary rate limit is retried
//! exactly once per request; abuse detection is never retried.

mod error;

pub use error::ContentsError;

use octocrab::models::repos::ContentItems;
use octocrab::Octocrab;
use tracing::{debug, warn};

/// Internal retries allowed after a primary rate limit response.
const RATE_LIMIT_RETRIES: u8 = 1;

/// Fetches one configured file path from many repositories.
#[derive(Clone)]
pub struct ContentsFetcher {
    octocrab: Octocrab,
    file_path: String,
}

impl ContentsFetcher {
    /// Builds a fetcher with an authenticated GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    pub fn new(
        token: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Result<Self, octocrab::Error> {
        let octocrab = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::from_client(octocrab, file_path))
    }

    /// Builds a fetcher from an existing client.
    ///
    /// Useful for GitHub Enterprise endpoints or preconfigured clients.
    pub fn from_client(octocrab: Octocrab, file_path: impl Into<String>) -> Self {
        Self {
            octocrab,
            file_path: file_path.into(),
        }
    }

    /// Returns the file path this fetcher retrieves.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Fetches the configured file from `repository` as decoded UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ContentsError`] if the identifier is malformed, the file is
    /// missing or a directory, the rate limit retry is exhausted, abuse
    /// detection fires, or any other API error occurs.
    pub async fn fetch(&self, repository: &str) -> Result<String, ContentsError> {
        let (owner, name) = split_repository(repository)?;
        self.fetch_with_retries(repository, owner, name, RATE_LIMIT_RETRIES)
            .await
    }

    /// Fetch loop with an explicit bounded retry counter for rate limits.
    async fn fetch_with_retries(
        &self,
        repository: &str,
        owner: &str,
        name: &str,
        mut retries_remaining: u8,
    ) -> Result<String, ContentsError> {
        loop {
            match self.get_file(owner, name).await {
                Ok(contents) => return self.decode_file(repository, contents),
                Err(error) => {
                    let classified = classify_github_error(error, &self.file_path, repository);
                    if matches!(classified, ContentsError::RateLimited { .. })
                        && retries_remaining > 0
                    {
                        retries_remaining -= 1;
                        warn!(repo = %repository, "Primary rate limit hit, retrying once");
                        continue;
                    }
                    return Err(classified);
                }
            }
        }
    }

    async fn get_file(&self, owner: &str, name: &str) -> Result<ContentItems, octocrab::Error> {
        self.octocrab
            .repos(owner, name)
            .get_content()
            .path(&self.file_path)
            .send()
            .await
    }

    fn decode_file(
        &self,
        repository: &str,
        contents: ContentItems,
    ) -> Result<String, ContentsError> {
        // A directory listing comes back as items whose paths differ from
        // the requested one.
        let item = contents
            .items
            .into_iter()
            .find(|item| item.path == self.file_path)
            .ok_or_else(|| ContentsError::NotAFile {
                file: self.file_path.clone(),
            })?;

        debug!(repo = %repository, file = %self.file_path, "Fetched file content");
        item.decoded_content()
            .ok_or_else(|| ContentsError::EmptyContent {
                file: self.file_path.clone(),
                repository: repository.to_string(),
            })
    }
}

/// Splits an `owner/name` identifier into its parts.
fn split_repository(repository: &str) -> Result<(&str, &str), ContentsError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
        _ => Err(ContentsError::InvalidRepository {
            repository: repository.to_string(),
        }),
    }
}

/// Maps an octocrab error to the fetch error taxonomy.
fn classify_github_error(
    error: octocrab::Error,
    file: &str,
    repository: &str,
) -> ContentsError {
    if let octocrab::Error::GitHub { ref source, .. } = error {
        let status = source.status_code.as_u16();
        let message = source.message.to_lowercase();

        if status == 404 {
            return ContentsError::NotFound {
                file: file.to_string(),
                repository: repository.to_string(),
            };
        }
        if message.contains("abuse") || message.contains("secondary rate limit") {
            return ContentsError::AbuseDetected {
                repository: repository.to_string(),
                message: source.message.clone(),
            };
        }
        if (status == 403 || status == 429) && message.contains("rate limit") {
            return ContentsError::RateLimited {
                file: file.to_string(),
                repository: repository.to_string(),
            };
        }
    }
    ContentsError::GitHub(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_owner_and_name() {
        let (owner, name) = split_repository("acme/web").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(name, "web");
    }

    #[test]
    fn name_may_contain_further_slashes() {
        // split_once keeps everything after the first separator
        let (owner, name) = split_repository("acme/web/extra").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(name, "web/extra");
    }

    #[test]
    fn rejects_identifiers_without_separator() {
        assert!(matches!(
            split_repository("acme"),
            Err(ContentsError::InvalidRepository { .. })
        ));
    }

    #[test]
    fn rejects_empty_owner_or_name() {
        assert!(split_repository("/web").is_err());
        assert!(split_repository("acme/").is_err());
        assert!(split_repository("").is_err());
    }

    #[test]
    fn abuse_detection_is_batch_fatal() {
        let error = ContentsError::AbuseDetected {
            repository: "acme/web".to_string(),
            message: "You have triggered an abuse detection mechanism.".to_string(),
        };
        assert!(error.is_batch_fatal());

        let error = ContentsError::NotFound {
            file: "package.json".to_string(),
            repository: "acme/web".to_string(),
        };
        assert!(!error.is_batch_fatal());
    }
}
