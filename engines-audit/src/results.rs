//! Classified batch outcomes.

use serde::Serialize;

/// The classified result of one repository lookup.
///
/// A repository with several matching engines contributes one [`Match`]
/// outcome per engine.
///
/// [`Match`]: Outcome::Match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The file was fetched and an engine entry satisfied the search.
    Match {
        /// Repository in `owner/name` form.
        repository: String,
        /// Matched engine name.
        engine: String,
        /// Matched version constraint string.
        version: String,
    },

    /// The file was fetched and parsed, but nothing satisfied the search.
    NoMatch {
        /// Repository in `owner/name` form.
        repository: String,
    },

    /// The file could not be fetched or parsed.
    SearchError {
        /// Repository in `owner/name` form.
        repository: String,
        /// Rendered error message.
        error: String,
    },
}

impl Outcome {
    /// Returns the repository this outcome belongs to.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Match { repository, .. }
            | Self::NoMatch { repository }
            | Self::SearchError { repository, .. } => repository,
        }
    }

    /// True for [`Outcome::Match`].
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// The aggregate product of one collected batch run.
///
/// Every recorded outcome appears in `all_results` and in exactly one of the
/// three category lists; the partition is exhaustive and disjoint. A result
/// set is immutable once the batch returns it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    /// Every outcome, in the order it was recorded.
    pub all_results: Vec<Outcome>,

    /// Match outcomes only.
    pub search_matches: Vec<Outcome>,

    /// No-match outcomes only.
    pub search_no_matches: Vec<Outcome>,

    /// Error outcomes only.
    pub search_errors: Vec<Outcome>,
}

impl ResultSet {
    /// Records an outcome into `all_results` and its category list.
    pub fn record(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Match { .. } => self.search_matches.push(outcome.clone()),
            Outcome::NoMatch { .. } => self.search_no_matches.push(outcome.clone()),
            Outcome::SearchError { .. } => self.search_errors.push(outcome.clone()),
        }
        self.all_results.push(outcome);
    }

    /// True if any repository errored.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.search_errors.is_empty()
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all_results.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_results.is_empty()
    }
}
