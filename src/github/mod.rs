//! GitHub collaborators: wire types, the board capability trait, and the
//! HTTP client implementing it.

pub mod client;
pub mod webhook;

pub use client::GitHubClient;

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::GitHubError;

/// A classic project board (subset of fields we care about).
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// A column on a project board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectColumn {
    pub id: u64,
    pub name: String,
}

/// A card on a project board.
///
/// `content_url` links the card to an issue; note-only cards have none.
/// The listing endpoint does not reliably carry `column_id`, so the refresh
/// stamps it with the column the card was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectCard {
    pub id: u64,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub column_id: Option<u64>,
}

/// Capabilities consumed from the remote board and team collaborators.
///
/// The bot only ever reads the board wholesale and issues single-card move
/// commands; everything else stays local.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, GitHubError>;
    async fn list_columns(&self, project_id: u64) -> Result<Vec<ProjectColumn>, GitHubError>;
    async fn list_cards(&self, column_id: u64) -> Result<Vec<ProjectCard>, GitHubError>;
    async fn move_card(&self, card_id: u64, column_id: u64) -> Result<(), GitHubError>;
    async fn list_team_members(&self, team_slug: &str) -> Result<Vec<String>, GitHubError>;
}
