//! Application settings
//!
//! Loaded from `themis.toml`, overridable via `THEMIS_`-prefixed
//! environment variables with `__` separating section and key (e.g.
//! `THEMIS_SERVER__PORT`), with CLI flags taking final precedence.
//! Secrets (Jira token, model API key) are never stored in the file; the
//! settings name the environment variables that hold them.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub jira: JiraSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub agent: AgentRunSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    /// Connection URL: sqlite://, postgres:// or mysql://
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://themis.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

/// Jira instance coordinates. The API token is read from the environment
/// variable named by `api_token_env`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JiraSettings {
    /// Base URL of the Jira instance (e.g. "https://example.atlassian.net")
    #[serde(default)]
    pub instance_url: String,
    /// Jira account username (email for cloud instances)
    #[serde(default)]
    pub username: String,
    /// Environment variable holding the API token
    #[serde(default = "default_jira_token_env")]
    pub api_token_env: String,
    /// Key of the project all agent operations are scoped to
    #[serde(default)]
    pub project_key: String,
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            instance_url: String::new(),
            username: String::new(),
            api_token_env: default_jira_token_env(),
            project_key: String::new(),
        }
    }
}

fn default_jira_token_env() -> String {
    "JIRA_API_TOKEN".to_string()
}

/// Language-model settings for all completion calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub frequency_penalty: f32,
    #[serde(default)]
    pub presence_penalty: f32,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom base URL for OpenAI-compatible endpoints
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: None,
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            api_key_env: default_api_key_env(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_top_p() -> f32 {
    1.0
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Settings for the agent loop itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentRunSettings {
    /// Iteration budget for one agent run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// How the loop concludes when the budget is exhausted
    #[serde(default)]
    pub early_stopping_method: EarlyStoppingMethod,
    /// Enable debug-level loop logging
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Re-prompt once on unparseable model output instead of terminating
    #[serde(default = "default_true")]
    pub handle_parsing_errors: bool,
}

impl Default for AgentRunSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            early_stopping_method: EarlyStoppingMethod::default(),
            verbose: true,
            handle_parsing_errors: true,
        }
    }
}

fn default_max_iterations() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Early-stopping policy when the iteration budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EarlyStoppingMethod {
    /// Ask the model for one final tool-free answer over the scratchpad
    #[default]
    Generate,
    /// Return a fixed best-effort message built from the last observation
    Force,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file("themis.toml")
    }

    /// Create settings from CLI arguments (config file plus CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::from_file(
            cli.config
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("config path is not valid UTF-8"))?,
        )?;
        settings.apply_cli_overrides(cli);
        Ok(settings)
    }

    fn from_file(path: &str) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("THEMIS").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(url) = &cli.database_url {
            self.database.url = url.clone();
        }
    }
}
