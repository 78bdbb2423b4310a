//! HTTP client for the classic GitHub Projects API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{BoardApi, Project, ProjectCard, ProjectColumn};
use crate::config::BotConfig;
use crate::errors::GitHubError;

/// The classic Projects endpoints sit behind this preview media type.
const PROJECTS_ACCEPT: &str = "application/vnd.github.inertia-preview+json";
const PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct TeamMember {
    login: String,
}

#[derive(serde::Serialize)]
struct MoveRequest {
    position: &'static str,
    column_id: u64,
}

/// Authenticated client against one GitHub installation.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    org: String,
}

impl GitHubClient {
    /// Build a client from config. Every request is bounded by the
    /// configured timeout so a hung call cannot stall the mirror lock
    /// indefinitely.
    pub fn new(config: &BotConfig) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            org: config.organization.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "boardbot")
            .header("Accept", PROJECTS_ACCEPT)
    }

    /// Fetch every page of a list endpoint (`per_page=100` + page loop).
    async fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = self
                .get(&url)
                .query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(GitHubError::Status {
                    status: resp.status(),
                    url,
                });
            }

            let batch: Vec<T> = resp.json().await?;
            let count = batch.len();
            all.extend(batch);

            if count < PER_PAGE {
                break; // Last page
            }
            page += 1;
        }

        Ok(all)
    }
}

#[async_trait]
impl BoardApi for GitHubClient {
    async fn list_projects(&self) -> Result<Vec<Project>, GitHubError> {
        self.get_paged(&format!("/orgs/{}/projects", self.org)).await
    }

    async fn list_columns(&self, project_id: u64) -> Result<Vec<ProjectColumn>, GitHubError> {
        self.get_paged(&format!("/projects/{project_id}/columns"))
            .await
    }

    async fn list_cards(&self, column_id: u64) -> Result<Vec<ProjectCard>, GitHubError> {
        self.get_paged(&format!("/projects/columns/{column_id}/cards"))
            .await
    }

    async fn move_card(&self, card_id: u64, column_id: u64) -> Result<(), GitHubError> {
        let url = format!("{}/projects/columns/cards/{card_id}/moves", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "boardbot")
            .header("Accept", PROJECTS_ACCEPT)
            .json(&MoveRequest {
                position: "top",
                column_id,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GitHubError::Status {
                status: resp.status(),
                url,
            });
        }
        Ok(())
    }

    async fn list_team_members(&self, team_slug: &str) -> Result<Vec<String>, GitHubError> {
        let members: Vec<TeamMember> = self
            .get_paged(&format!("/orgs/{}/teams/{team_slug}/members", self.org))
            .await?;
        Ok(members.into_iter().map(|m| m.login).collect())
    }
}
