//! Transition policy: decides when an assignment change moves an issue's
//! card between the two policy columns.
//!
//! The rules, first match wins:
//! 1. issue in Developing, single assignee is QA → move to Testing
//! 2. issue in Testing, single assignee is Dev → move to Developing
//! 3. otherwise nothing happens.
//!
//! Every failure along the way (issue not on the board, stale column,
//! remote move rejected) is logged and the event dropped; none of them is
//! a handler failure and no retry is scheduled.

use std::sync::Arc;

use tracing::{error, info};

use crate::errors::MirrorError;
use crate::github::webhook::IssuesEvent;
use crate::mirror::BoardMirror;
use crate::teams::TeamDirectory;

/// Normalized "issue assignment changed" fact. Produced from a webhook
/// delivery, consumed once, never stored.
#[derive(Debug, Clone)]
pub struct AssignmentFact {
    pub action: String,
    pub issue_url: String,
    pub title: String,
    pub open: bool,
    pub assignees: Vec<String>,
}

impl AssignmentFact {
    pub fn from_event(event: &IssuesEvent) -> Self {
        Self {
            action: event.action.clone(),
            issue_url: event.issue.url.clone(),
            title: event.issue.title.clone(),
            open: event.issue.state == "open",
            assignees: event
                .issue
                .assignees
                .iter()
                .map(|a| a.login.clone())
                .collect(),
        }
    }
}

pub struct PolicyEngine {
    mirror: Arc<BoardMirror>,
    teams: TeamDirectory,
    developing_column: String,
    testing_column: String,
}

impl PolicyEngine {
    pub fn new(
        mirror: Arc<BoardMirror>,
        teams: TeamDirectory,
        developing_column: String,
        testing_column: String,
    ) -> Self {
        Self {
            mirror,
            teams,
            developing_column,
            testing_column,
        }
    }

    /// Apply the transition rules to one assignment fact.
    pub async fn apply(&self, fact: &AssignmentFact) {
        if fact.action != "assigned" && fact.action != "unassigned" {
            return;
        }
        if !fact.open || fact.assignees.len() != 1 {
            return;
        }
        let assignee = &fact.assignees[0];
        info!(
            "issue \"{}\" is now only assigned to {}",
            fact.title, assignee
        );

        let column = match self.mirror.find_column_of_issue(&fact.issue_url).await {
            Ok(column) => column,
            Err(err) => {
                info!(
                    "dropping assignment event for issue \"{}\": {}",
                    fact.title, err
                );
                return;
            }
        };
        info!("issue \"{}\" is in column \"{}\"", fact.title, column.name);

        let target = if column.name == self.developing_column && self.teams.is_qa(assignee) {
            &self.testing_column
        } else if column.name == self.testing_column && self.teams.is_dev(assignee) {
            &self.developing_column
        } else {
            return;
        };

        info!("moving issue \"{}\" to \"{}\"", fact.title, target);
        if let Err(err) = self.mirror.move_card_to_column(&fact.issue_url, target).await {
            match err {
                MirrorError::Remote(remote) => {
                    error!(
                        "failed to move issue \"{}\" to \"{}\": {}",
                        fact.title, target, remote
                    );
                }
                other => {
                    error!(
                        "mirror rejected move of issue \"{}\" to \"{}\": {}",
                        fact.title, target, other
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::stub::StubBoard;
    use crate::github::{ProjectCard, ProjectColumn};

    const ISSUE_URL: &str = "https://api.github.com/repos/acme/app/issues/12";

    fn fact(action: &str, open: bool, assignees: &[&str]) -> AssignmentFact {
        AssignmentFact {
            action: action.to_string(),
            issue_url: ISSUE_URL.to_string(),
            title: "Crash on resume".to_string(),
            open,
            assignees: assignees.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Engine over a refreshed board with columns {Developing: 1,
    /// Testing: 2}, the issue card sitting in `column_id`, QA member
    /// "tess" and Dev member "devin".
    async fn engine_on_board(
        column_id: u64,
    ) -> (PolicyEngine, Arc<BoardMirror>, Arc<StubBoard>) {
        let api = Arc::new(StubBoard {
            projects: vec![crate::github::Project {
                id: 1,
                name: "Release board".into(),
            }],
            columns: [(
                1u64,
                vec![
                    ProjectColumn {
                        id: 1,
                        name: "Developing".into(),
                    },
                    ProjectColumn {
                        id: 2,
                        name: "Testing".into(),
                    },
                ],
            )]
            .into(),
            cards: [(
                column_id,
                vec![ProjectCard {
                    id: 10,
                    content_url: Some(ISSUE_URL.to_string()),
                    column_id: None,
                }],
            )]
            .into(),
            ..StubBoard::default()
        });

        let mirror = Arc::new(BoardMirror::new(api.clone()));
        mirror.refresh("acme", "Release board").await.unwrap();
        let teams = TeamDirectory::from_members(
            vec!["tess".to_string()],
            vec!["devin".to_string()],
        );
        let engine = PolicyEngine::new(
            mirror.clone(),
            teams,
            "Developing".to_string(),
            "Testing".to_string(),
        );
        (engine, mirror, api)
    }

    #[tokio::test]
    async fn qa_assignee_in_developing_moves_to_testing() {
        let (engine, mirror, api) = engine_on_board(1).await;
        engine.apply(&fact("assigned", true, &["tess"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Testing");
        assert_eq!(api.recorded_moves(), vec![(10, 2)]);
    }

    #[tokio::test]
    async fn non_qa_assignee_in_developing_is_a_noop() {
        let (engine, mirror, api) = engine_on_board(1).await;
        engine.apply(&fact("assigned", true, &["stranger"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Developing");
        assert!(api.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn dev_assignee_in_testing_moves_to_developing() {
        let (engine, mirror, api) = engine_on_board(2).await;
        engine.apply(&fact("unassigned", true, &["devin"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Developing");
        assert_eq!(api.recorded_moves(), vec![(10, 1)]);
    }

    #[tokio::test]
    async fn qa_assignee_in_testing_stays_put() {
        let (engine, mirror, api) = engine_on_board(2).await;
        engine.apply(&fact("assigned", true, &["tess"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Testing");
        assert!(api.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn multiple_assignees_produce_no_move() {
        let (engine, mirror, api) = engine_on_board(1).await;
        engine
            .apply(&fact("assigned", true, &["tess", "devin"]))
            .await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Developing");
        assert!(api.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn closed_issue_produces_no_move() {
        let (engine, mirror, api) = engine_on_board(1).await;
        engine.apply(&fact("assigned", false, &["tess"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Developing");
        assert!(api.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn irrelevant_action_produces_no_move() {
        let (engine, mirror, api) = engine_on_board(1).await;
        engine.apply(&fact("labeled", true, &["tess"])).await;

        let column = mirror.find_column_of_issue(ISSUE_URL).await.unwrap();
        assert_eq!(column.name, "Developing");
        assert!(api.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn untracked_issue_is_dropped_quietly() {
        let (engine, _mirror, _api) = engine_on_board(1).await;
        let mut missing = fact("assigned", true, &["tess"]);
        missing.issue_url = "https://api.github.com/repos/acme/app/issues/404".into();
        // Must not panic or error; the event is simply dropped.
        engine.apply(&missing).await;
    }

    #[tokio::test]
    async fn fact_from_event_normalizes_fields() {
        let event: IssuesEvent = serde_json::from_str(
            r#"{
                "action": "assigned",
                "issue": {
                    "url": "https://api.github.com/repos/acme/app/issues/1",
                    "title": "t",
                    "state": "closed",
                    "assignees": [{"login": "a"}, {"login": "b"}]
                }
            }"#,
        )
        .unwrap();
        let fact = AssignmentFact::from_event(&event);
        assert_eq!(fact.action, "assigned");
        assert!(!fact.open);
        assert_eq!(fact.assignees, vec!["a", "b"]);
    }
}
