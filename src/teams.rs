//! Snapshot of the QA and Dev team memberships.
//!
//! Loaded once at bootstrap; membership checks afterwards are pure lookups
//! against the snapshot, never remote calls.

use std::collections::HashSet;

use crate::errors::GitHubError;
use crate::github::BoardApi;

pub struct TeamDirectory {
    qa: HashSet<String>,
    dev: HashSet<String>,
}

impl TeamDirectory {
    /// Build a directory from already-known member logins.
    pub fn from_members<I, J>(qa: I, dev: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            qa: qa.into_iter().collect(),
            dev: dev.into_iter().collect(),
        }
    }

    /// Page both configured teams' member lists into a fresh snapshot.
    pub async fn load(
        api: &dyn BoardApi,
        qa_team: &str,
        dev_team: &str,
    ) -> Result<Self, GitHubError> {
        let qa = api.list_team_members(qa_team).await?;
        let dev = api.list_team_members(dev_team).await?;
        Ok(Self::from_members(qa, dev))
    }

    pub fn is_qa(&self, login: &str) -> bool {
        self.qa.contains(login)
    }

    pub fn is_dev(&self, login: &str) -> bool {
        self.dev.contains(login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::stub::StubBoard;

    #[test]
    fn membership_is_a_pure_lookup() {
        let teams = TeamDirectory::from_members(
            vec!["tess".to_string()],
            vec!["devin".to_string(), "tess".to_string()],
        );
        assert!(teams.is_qa("tess"));
        assert!(!teams.is_qa("devin"));
        assert!(teams.is_dev("devin"));
        // A login may sit in both teams.
        assert!(teams.is_dev("tess"));
        assert!(!teams.is_dev("stranger"));
    }

    #[tokio::test]
    async fn load_pulls_both_configured_teams() {
        let api = StubBoard {
            teams: [
                ("qa".to_string(), vec!["tess".to_string()]),
                ("developers".to_string(), vec!["devin".to_string()]),
            ]
            .into(),
            ..StubBoard::default()
        };

        let teams = TeamDirectory::load(&api, "qa", "developers").await.unwrap();
        assert!(teams.is_qa("tess"));
        assert!(teams.is_dev("devin"));
        assert!(!teams.is_qa("devin"));
    }
}
