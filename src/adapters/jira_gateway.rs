//! Fail-soft gateway over the Jira API
//!
//! Every operation catches the underlying error at this boundary, logs it
//! with operation context, and returns a neutral value (`{}`, `None` or
//! `false`). Callers never see a Jira error; the agent loop and triage
//! workflow stay free of remote-failure handling.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::domain::{JiraApi, Ticket};

/// Resolved identity of the configured project, cached after first success.
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub id: String,
    pub key: String,
    pub name: String,
}

pub struct JiraGateway {
    api: Arc<dyn JiraApi>,
    project_key: String,
    // None until the first successful fetch; a failed fetch leaves it None
    // so the next call retries.
    project_info: RwLock<Option<ProjectInfo>>,
}

impl JiraGateway {
    pub fn new(api: Arc<dyn JiraApi>, project_key: impl Into<String>) -> Self {
        Self {
            api,
            project_key: project_key.into(),
            project_info: RwLock::new(None),
        }
    }

    /// Resolve the configured project, from cache unless `refresh`.
    pub async fn project_info(&self, refresh: bool) -> Option<ProjectInfo> {
        if !refresh {
            if let Some(info) = self.project_info.read().await.clone() {
                return Some(info);
            }
        }

        debug!(project_key = %self.project_key, "fetching project info");
        match self.api.projects().await {
            Ok(projects) => {
                match projects.iter().find(|p| p.key == self.project_key) {
                    Some(project) => {
                        let info = ProjectInfo {
                            id: project.id.clone(),
                            key: project.key.clone(),
                            name: project.name.clone(),
                        };
                        *self.project_info.write().await = Some(info.clone());
                        Some(info)
                    }
                    None => {
                        let available: Vec<&str> =
                            projects.iter().map(|p| p.key.as_str()).collect();
                        error!(
                            project_key = %self.project_key,
                            ?available,
                            "configured project not found"
                        );
                        None
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "error getting project info");
                None
            }
        }
    }

    /// All available projects, as key -> name. Empty on failure.
    pub async fn list_projects(&self) -> HashMap<String, String> {
        match self.api.projects().await {
            Ok(projects) => projects.into_iter().map(|p| (p.key, p.name)).collect(),
            Err(e) => {
                error!(error = %e, "error getting projects");
                HashMap::new()
            }
        }
    }

    /// Every ticket in the configured project, as key -> "summary\ndescription".
    pub async fn all_tickets(&self) -> HashMap<String, String> {
        let Some(info) = self.project_info(false).await else {
            return HashMap::new();
        };

        let jql = format!("project = {}", info.key);
        match self.api.search(&jql).await {
            Ok(issues) => {
                debug!(count = issues.len(), "fetched project tickets");
                issues.into_iter().map(|t| (t.key.clone(), t.body())).collect()
            }
            Err(e) => {
                error!(error = %e, "error getting tickets");
                HashMap::new()
            }
        }
    }

    /// Search tickets by JQL, as key -> "summary\ndescription".
    ///
    /// A missing project clause is injected; a clause naming the project by
    /// its human-readable name is rewritten to the key. Empty on failure.
    pub async fn search_issues(&self, jql: &str) -> HashMap<String, String> {
        let Some(info) = self.project_info(false).await else {
            return HashMap::new();
        };

        let by_name = format!("project = {}", info.name);
        let jql = if jql.contains(&by_name) {
            jql.replace(&by_name, &format!("project = {}", info.key))
        } else if !jql.contains("project =") {
            format!("project = {} AND {}", info.key, jql)
        } else {
            jql.to_string()
        };

        debug!(%jql, "searching tickets");
        match self.api.search(&jql).await {
            Ok(issues) => issues.into_iter().map(|t| (t.key.clone(), t.body())).collect(),
            Err(e) => {
                error!(error = %e, %jql, "error searching tickets");
                HashMap::new()
            }
        }
    }

    /// Fetch one ticket. `None` (not an error) if it cannot be fetched.
    pub async fn get_issue(&self, key: &str) -> Option<Ticket> {
        match self.api.issue(key).await {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                error!(error = %e, %key, "error getting ticket data");
                None
            }
        }
    }

    /// Create a "Relates" link between two tickets. A duplicate link is a
    /// tolerable failure, reported as `false` like any other.
    pub async fn link_issues(&self, from_issue: &str, to_issue: &str) -> bool {
        match self
            .api
            .create_issue_link("Relates", from_issue, to_issue)
            .await
        {
            Ok(()) => {
                info!(%from_issue, %to_issue, "linked issues");
                true
            }
            Err(e) => {
                error!(error = %e, %from_issue, %to_issue, "error linking issues");
                false
            }
        }
    }

    /// Add a comment to a ticket.
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> bool {
        match self.api.add_comment(issue_key, comment).await {
            Ok(()) => {
                info!(%issue_key, "added comment");
                true
            }
            Err(e) => {
                error!(error = %e, %issue_key, "error adding comment");
                false
            }
        }
    }
}
