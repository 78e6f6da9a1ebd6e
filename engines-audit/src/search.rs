//! Bulk repository engine search orchestration.
//!
//! A [`SearchConfig`] binds credentials and options once; the resulting
//! [`EnginesSearch`] turns repository lists into [`RepoBatch`] runs. Each
//! batch exposes two consumption modes over the same prepared work:
//!
//! - [`RepoBatch::get_results`] — strictly sequential, limit-bounded, returns
//!   a categorized [`ResultSet`] snapshot.
//! - [`RepoBatch::results_async`] — launches every repository up front and
//!   returns one independently-resolving future per repository.

use crate::contents::{ContentsError, ContentsFetcher};
use crate::engines::{match_engines, parse_manifest};
use crate::results::{Outcome, ResultSet};
use futures::future::BoxFuture;
use futures::FutureExt;
use octocrab::Octocrab;
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};

/// File fetched from each repository unless configured otherwise.
const DEFAULT_FILE_PATH: &str = "package.json";

/// Credentials and options bound once per configured search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    token: String,
    file_path: String,
    search_term: Option<String>,
}

impl SearchConfig {
    /// Creates a configuration fetching the default `package.json`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            file_path: DEFAULT_FILE_PATH.to_string(),
            search_term: None,
        }
    }

    /// Sets the file path to fetch from each repository.
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    /// Sets the engine name / version substring to search for.
    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = Some(search_term.into());
        self
    }

    /// Returns the configured token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the file path fetched from each repository.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Returns the search term, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }
}

/// Per-invocation options for one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Caps the number of repositories processed and reported in collected
    /// mode. Streaming mode is never limit-bounded.
    pub limit: Option<usize>,
}

/// A single repository's pipeline failure.
///
/// This is the rejection type of streaming mode; collected mode folds it
/// into an [`Outcome::SearchError`] value instead.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Fetching or decoding the file failed.
    #[error(transparent)]
    Contents(#[from] ContentsError),

    /// The fetched content was not a valid manifest.
    #[error("Failed to parse '{file}' from '{repository}': {source}")]
    Parse {
        file: String,
        repository: String,
        #[source]
        source: serde_json::Error,
    },

    /// The spawned per-repository task failed to run.
    #[error("Repository task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SearchError {
    /// True when the whole batch must stop, not just this repository.
    #[must_use]
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::Contents(source) if source.is_batch_fatal())
    }
}

/// Whole-batch failures.
#[derive(Debug, Error)]
pub enum BatchError {
    /// GitHub API client construction failed.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Abuse detection fired; no further requests may be issued.
    #[error("Batch aborted, abuse detected: {0}")]
    AbuseDetected(#[source] SearchError),
}

/// A configured engine search, reusable across repository lists.
pub struct EnginesSearch {
    fetcher: ContentsFetcher,
    search_term: Option<String>,
}

impl EnginesSearch {
    /// Builds a search with an authenticated GitHub client.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Octocrab`] if the client cannot be constructed.
    pub fn new(config: SearchConfig) -> Result<Self, BatchError> {
        let fetcher = ContentsFetcher::new(config.token, config.file_path)?;
        Ok(Self {
            fetcher,
            search_term: config.search_term,
        })
    }

    /// Builds a search from an existing client, e.g. one pointed at a GitHub
    /// Enterprise endpoint. The token in `config` is not used.
    pub fn with_client(octocrab: Octocrab, config: SearchConfig) -> Self {
        Self {
            fetcher: ContentsFetcher::from_client(octocrab, config.file_path),
            search_term: config.search_term,
        }
    }

    /// Prepares one batch run over `repositories`.
    pub fn batch(&self, repositories: Vec<String>, options: BatchOptions) -> RepoBatch {
        RepoBatch {
            fetcher: self.fetcher.clone(),
            search_term: self.search_term.clone(),
            repositories,
            limit: options.limit,
        }
    }
}

/// One prepared unit of work over a fixed repository list.
#[derive(Clone)]
pub struct RepoBatch {
    fetcher: ContentsFetcher,
    search_term: Option<String>,
    repositories: Vec<String>,
    limit: Option<usize>,
}

impl RepoBatch {
    /// Runs the batch sequentially and returns a categorized snapshot.
    ///
    /// Repositories are fetched one at a time in list order; each fetch
    /// completes before the next begins, which makes the `limit` cutoff
    /// exact and result order equal to input order. A repository's failure
    /// is recorded as an [`Outcome::SearchError`] and never aborts its
    /// neighbors.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AbuseDetected`] when abuse detection fires,
    /// which is the one condition that aborts the whole run.
    pub async fn get_results(&self) -> Result<ResultSet, BatchError> {
        let mut results = ResultSet::default();
        let limit = self.limit.unwrap_or(self.repositories.len());

        for repository in self.repositories.iter().take(limit) {
            match classify_repository(&self.fetcher, self.search_term.as_deref(), repository)
                .await
            {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        results.record(outcome);
                    }
                }
                Err(source) if source.is_batch_fatal() => {
                    error!(repo = %repository, error = %source, "Abuse detected, aborting batch");
                    return Err(BatchError::AbuseDetected(source));
                }
                Err(source) => {
                    results.record(Outcome::SearchError {
                        repository: repository.clone(),
                        error: source.to_string(),
                    });
                }
            }
        }

        info!(
            matches = results.search_matches.len(),
            no_matches = results.search_no_matches.len(),
            errors = results.search_errors.len(),
            "Batch complete"
        );
        Ok(results)
    }

    /// Launches every repository lookup up front and returns one future per
    /// repository, in input order.
    ///
    /// The sequence is never limit-bounded; the caller owns count and
    /// concurrency control. Each future resolves to the repository's
    /// [`Match`]/[`NoMatch`] outcomes, or rejects with the typed
    /// [`SearchError`] if its fetch or parse failed — errors are not folded
    /// into [`Outcome::SearchError`] values in this mode.
    ///
    /// [`Match`]: Outcome::Match
    /// [`NoMatch`]: Outcome::NoMatch
    pub fn results_async(&self) -> Vec<BoxFuture<'static, Result<Vec<Outcome>, SearchError>>> {
        self.repositories
            .iter()
            .map(|repository| {
                let fetcher = self.fetcher.clone();
                let search_term = self.search_term.clone();
                let repository = repository.clone();

                let handle = tokio::spawn(async move {
                    classify_repository(&fetcher, search_term.as_deref(), &repository).await
                });

                handle
                    .map(|joined| match joined {
                        Ok(result) => result,
                        Err(join_error) => Err(SearchError::Task(join_error)),
                    })
                    .boxed()
            })
            .collect()
    }
}

/// Runs the fetch -> parse -> match pipeline for one repository.
///
/// Returns the repository's outcomes: one [`Outcome::Match`] per matching
/// engine entry, a single [`Outcome::NoMatch`] when a search term found
/// nothing, or an empty vector when there was no term and nothing to report.
async fn classify_repository(
    fetcher: &ContentsFetcher,
    search_term: Option<&str>,
    repository: &str,
) -> Result<Vec<Outcome>, SearchError> {
    let span = info_span!("classify", repo = %repository);

    async {
        let content = fetcher.fetch(repository).await?;
        let manifest = parse_manifest(&content).map_err(|source| SearchError::Parse {
            file: fetcher.file_path().to_string(),
            repository: repository.to_string(),
            source,
        })?;

        let entries = match_engines(&manifest, search_term);
        if entries.is_empty() {
            // Without a search term, an absent or empty engines field is
            // nothing to report rather than an explicit no-match.
            if search_term.is_none() {
                debug!("No engine entries to report");
                return Ok(Vec::new());
            }
            debug!("No engine entries satisfy the search term");
            return Ok(vec![Outcome::NoMatch {
                repository: repository.to_string(),
            }]);
        }

        debug!(count = entries.len(), "Matched engine entries");
        Ok(entries
            .into_iter()
            .map(|entry| Outcome::Match {
                repository: repository.to_string(),
                engine: entry.name,
                version: entry.version,
            })
            .collect())
    }
    .instrument(span)
    .await
}
