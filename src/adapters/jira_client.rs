//! Jira REST client
//!
//! Thin typed client for the Jira Cloud REST API v2. Returns errors for
//! every failure; the fail-soft policy is `JiraGateway`'s job.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::JiraSettings;
use crate::domain::{JiraApi, Project, Ticket};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum JiraError {
    /// Credentials environment variable missing
    #[error("Environment variable {0} not set")]
    Credentials(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira returned a non-success status
    #[error("Jira API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// HTTP implementation of the `JiraApi` port
pub struct JiraHttpClient {
    client: Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl JiraHttpClient {
    /// Create a client from settings. The API token is read from the
    /// environment variable named by `api_token_env`.
    pub fn new(settings: &JiraSettings) -> Result<Self, JiraError> {
        let api_token = std::env::var(&settings.api_token_env)
            .map_err(|_| JiraError::Credentials(settings.api_token_env.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.instance_url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            api_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, JiraError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(JiraError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, JiraError> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
            .query(query)
            .send()
            .await?;
        self.check(response).await
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, JiraError> {
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
            .json(body)
            .send()
            .await?;
        self.check(response).await
    }
}

#[async_trait]
impl JiraApi for JiraHttpClient {
    async fn projects(&self) -> anyhow::Result<Vec<Project>> {
        let response = self.get("project", &[]).await?;
        let projects: Vec<ProjectDto> = response.json().await.map_err(JiraError::Http)?;
        Ok(projects.into_iter().map(ProjectDto::into_project).collect())
    }

    async fn search(&self, jql: &str) -> anyhow::Result<Vec<Ticket>> {
        let response = self.get("search", &[("jql", jql)]).await?;
        let result: SearchDto = response.json().await.map_err(JiraError::Http)?;
        Ok(result.issues.into_iter().map(IssueDto::into_ticket).collect())
    }

    async fn issue(&self, key: &str) -> anyhow::Result<Ticket> {
        let response = self.get(&format!("issue/{key}"), &[]).await?;
        let issue: IssueDto = response.json().await.map_err(JiraError::Http)?;
        Ok(issue.into_ticket())
    }

    async fn create_issue_link(
        &self,
        link_type: &str,
        inward: &str,
        outward: &str,
    ) -> anyhow::Result<()> {
        let body = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": inward },
            "outwardIssue": { "key": outward },
        });
        self.post("issueLink", &body).await?;
        Ok(())
    }

    async fn add_comment(&self, key: &str, body: &str) -> anyhow::Result<()> {
        self.post(&format!("issue/{key}/comment"), &json!({ "body": body }))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    id: String,
    key: String,
    name: String,
}

impl ProjectDto {
    fn into_project(self) -> Project {
        Project {
            id: self.id,
            key: self.key,
            name: self.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchDto {
    issues: Vec<IssueDto>,
}

#[derive(Debug, Deserialize)]
struct IssueDto {
    key: String,
    fields: FieldsDto,
}

#[derive(Debug, Deserialize)]
struct FieldsDto {
    summary: Option<String>,
    description: Option<String>,
}

impl IssueDto {
    fn into_ticket(self) -> Ticket {
        Ticket {
            key: self.key,
            summary: self.fields.summary.unwrap_or_default(),
            description: self.fields.description.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_dto_tolerates_missing_fields() {
        let dto: IssueDto = serde_json::from_value(json!({
            "key": "KA-01-5",
            "fields": { "summary": "Add OAuth2 support" }
        }))
        .unwrap();

        let ticket = dto.into_ticket();
        assert_eq!(ticket.key, "KA-01-5");
        assert_eq!(ticket.summary, "Add OAuth2 support");
        assert_eq!(ticket.description, "");
        assert_eq!(ticket.body(), "Add OAuth2 support\n");
    }

    #[test]
    fn search_dto_parses_issue_list() {
        let dto: SearchDto = serde_json::from_value(json!({
            "issues": [
                { "key": "KA-01-1", "fields": { "summary": "a", "description": "b" } },
                { "key": "KA-01-2", "fields": { "summary": "c", "description": null } }
            ]
        }))
        .unwrap();

        assert_eq!(dto.issues.len(), 2);
        assert_eq!(dto.issues[1].fields.description, None);
    }
}
