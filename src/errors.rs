//! Typed error hierarchy for boardbot.
//!
//! Two top-level enums cover the two failure domains:
//! - `GitHubError` — outbound calls to the GitHub API
//! - `MirrorError` — local board-mirror consistency failures
//!
//! Every `MirrorError` raised while handling a webhook delivery is logged
//! and swallowed at the dispatch boundary; only bootstrap treats remote
//! failures as fatal.

use thiserror::Error;

/// Errors from the GitHub API client.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no project named \"{name}\" in organization \"{org}\"")]
    ProjectNotFound { name: String, org: String },
}

/// Errors from board-mirror operations.
///
/// All variants except `Remote` describe local consistency failures and are
/// recoverable: the triggering event is dropped with a diagnostic.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("card {id} is already tracked")]
    DuplicateCard { id: u64 },

    #[error("card {id} is not tracked")]
    CardNotFound { id: u64 },

    #[error("no tracked card references issue {url}")]
    IssueNotTracked { url: String },

    #[error("card {card_id} references stale or missing column {column_id:?}")]
    ColumnNotFound {
        card_id: u64,
        column_id: Option<u64>,
    },

    #[error("no column named \"{name}\" on the board")]
    UnknownColumn { name: String },

    #[error(transparent)]
    Remote(#[from] GitHubError),
}
