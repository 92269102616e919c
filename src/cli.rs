use clap::Parser;
use std::path::PathBuf;

/// Jira agent service - natural-language requests resolved into Jira
/// operations by a tool-calling LLM loop
#[derive(Parser, Debug, Clone)]
#[command(name = "themis", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "THEMIS_CONFIG", default_value = "themis.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "THEMIS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "THEMIS_PORT")]
    pub port: Option<u16>,

    /// Database connection URL
    #[arg(long, env = "THEMIS_DATABASE_URL")]
    pub database_url: Option<String>,
}
