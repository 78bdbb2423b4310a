//! In-memory mirror of the tracked project board.
//!
//! The mirror is the only shared mutable state in the process: one column
//! set and one card set, both owned by a single [`BoardMirror`] constructed
//! at startup and threaded by reference into every component that needs it.
//! Every operation serializes on one `tokio::sync::Mutex`, including the
//! outbound move command issued from [`BoardMirror::move_card_to_column`],
//! so concurrent webhook deliveries apply one at a time.
//!
//! Cards are keyed by id in a map; columns are only ever replaced wholesale
//! by [`BoardMirror::refresh`] and are immutable between refreshes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::errors::{GitHubError, MirrorError};
use crate::github::{BoardApi, ProjectCard, ProjectColumn};

#[derive(Default)]
struct MirrorState {
    columns: Vec<ProjectColumn>,
    cards: HashMap<u64, ProjectCard>,
}

impl MirrorState {
    fn column_of(&self, card: &ProjectCard) -> Result<ProjectColumn, MirrorError> {
        // A card event can reference a column the last refresh never saw;
        // that is a stale mirror, not a crash.
        card.column_id
            .and_then(|id| self.columns.iter().find(|c| c.id == id))
            .cloned()
            .ok_or(MirrorError::ColumnNotFound {
                card_id: card.id,
                column_id: card.column_id,
            })
    }
}

/// The authoritative local view of the tracked board.
pub struct BoardMirror {
    api: Arc<dyn BoardApi>,
    state: Mutex<MirrorState>,
}

impl BoardMirror {
    /// Create an empty mirror. [`BoardMirror::refresh`] must run before the
    /// mirror can answer lookups.
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        Self {
            api,
            state: Mutex::new(MirrorState::default()),
        }
    }

    /// Track a new card.
    pub async fn append(&self, card: ProjectCard) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        if state.cards.contains_key(&card.id) {
            return Err(MirrorError::DuplicateCard { id: card.id });
        }
        state.cards.insert(card.id, card);
        Ok(())
    }

    /// Stop tracking a card.
    pub async fn remove(&self, card_id: u64) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        state
            .cards
            .remove(&card_id)
            .map(|_| ())
            .ok_or(MirrorError::CardNotFound { id: card_id })
    }

    /// Overwrite a tracked card's full state. Conversion can change the
    /// card's `content_url`, so the whole entry is replaced.
    pub async fn replace(&self, card: ProjectCard) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        match state.cards.get_mut(&card.id) {
            Some(entry) => {
                *entry = card;
                Ok(())
            }
            None => Err(MirrorError::CardNotFound { id: card.id }),
        }
    }

    /// Find the column currently holding the card that wraps `issue_url`.
    pub async fn find_column_of_issue(&self, issue_url: &str) -> Result<ProjectColumn, MirrorError> {
        let state = self.state.lock().await;
        let card = state
            .cards
            .values()
            .find(|card| card.content_url.as_deref() == Some(issue_url))
            .ok_or_else(|| MirrorError::IssueNotTracked {
                url: issue_url.to_string(),
            })?;
        state.column_of(card)
    }

    /// Move the card wrapping `issue_url` into the named column.
    ///
    /// The remote move command runs under the mirror lock; the card's
    /// column is updated only after the command succeeds, so a remote
    /// failure leaves the mirror untouched. A card already sitting in the
    /// target column is left alone without a remote call.
    pub async fn move_card_to_column(
        &self,
        issue_url: &str,
        column_name: &str,
    ) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        let column = state
            .columns
            .iter()
            .find(|c| c.name == column_name)
            .cloned()
            .ok_or_else(|| MirrorError::UnknownColumn {
                name: column_name.to_string(),
            })?;
        let card = state
            .cards
            .values_mut()
            .find(|card| card.content_url.as_deref() == Some(issue_url))
            .ok_or_else(|| MirrorError::IssueNotTracked {
                url: issue_url.to_string(),
            })?;

        if card.column_id == Some(column.id) {
            return Ok(());
        }

        self.api.move_card(card.id, column.id).await?;
        card.column_id = Some(column.id);
        Ok(())
    }

    /// Replace the entire mirror with a fresh paginated read of the board.
    ///
    /// The replacement sets are assembled before the mirror is touched and
    /// swapped in only once every listing call has succeeded; a failed
    /// refresh leaves the previous contents intact. Callers still treat a
    /// bootstrap refresh failure as fatal.
    pub async fn refresh(&self, org: &str, project_name: &str) -> Result<(), GitHubError> {
        let projects = self.api.list_projects().await?;
        let project = projects
            .into_iter()
            .find(|p| p.name == project_name)
            .ok_or_else(|| GitHubError::ProjectNotFound {
                name: project_name.to_string(),
                org: org.to_string(),
            })?;

        let columns = self.api.list_columns(project.id).await?;
        let mut cards = HashMap::new();
        for column in &columns {
            let listed = self.api.list_cards(column.id).await?;
            info!("got {} cards in column \"{}\"", listed.len(), column.name);
            for mut card in listed {
                // The listing does not reliably carry the column id.
                card.column_id = Some(column.id);
                cards.insert(card.id, card);
            }
        }
        info!(
            "got total {} cards in project \"{}\"",
            cards.len(),
            project_name
        );

        let mut state = self.state.lock().await;
        state.columns = columns;
        state.cards = cards;
        Ok(())
    }
}
