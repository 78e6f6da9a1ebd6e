//! CLI for the engines audit.
//!
//! Fetches a manifest file from each listed repository and reports the
//! declared engines version constraints, optionally filtered by a search
//! term.

use clap::Parser;
use engines_audit::{BatchError, BatchOptions, EnginesSearch, Outcome, ResultSet, SearchConfig};
use std::io::{self, BufRead};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Engines Audit - Report declared engines versions across GitHub repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,

    /// File to fetch from each repository.
    #[arg(long, default_value = "package.json")]
    file: String,

    /// Substring to match against engine names and version constraints.
    #[arg(long)]
    search: Option<String>,

    /// Maximum number of repositories to report on.
    #[arg(long)]
    limit: Option<usize>,

    /// Repositories in owner/name form; read from stdin when omitted.
    repos: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(results) => {
            print_results(&results);

            if results.has_errors() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Compact single-line output; log level filtering via `RUST_LOG` (defaults
/// to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<ResultSet, BatchError> {
    let repositories = if args.repos.is_empty() {
        read_repositories_from_stdin()
    } else {
        args.repos
    };

    let mut config = SearchConfig::new(args.token).with_file_path(args.file);
    if let Some(term) = args.search {
        config = config.with_search_term(term);
    }

    let search = EnginesSearch::new(config)?;
    search
        .batch(repositories, BatchOptions { limit: args.limit })
        .get_results()
        .await
}

/// Reads one repository identifier per stdin line, skipping blanks.
fn read_repositories_from_stdin() -> Vec<String> {
    io::stdin()
        .lock()
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Prints matches to stdout and everything else to stderr, so match output
/// stays pipeable.
fn print_results(results: &ResultSet) {
    for outcome in &results.search_matches {
        if let Outcome::Match {
            repository,
            engine,
            version,
        } = outcome
        {
            println!("{engine}@{version}: {repository}");
        }
    }

    for outcome in &results.search_no_matches {
        if let Outcome::NoMatch { repository } = outcome {
            eprintln!("no match: {repository}");
        }
    }

    for outcome in &results.search_errors {
        if let Outcome::SearchError { repository, error } = outcome {
            eprintln!("error: {repository}: {error}");
        }
    }

    eprintln!();
    eprintln!("Summary:");
    eprintln!("  Matches: {}", results.search_matches.len());
    eprintln!("  No matches: {}", results.search_no_matches.len());
    eprintln!("  Errors: {}", results.search_errors.len());
}
