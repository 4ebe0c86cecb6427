use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub state_path: String,
    pub refresh_interval_secs: u64,
    pub log_level: String,
    pub email: Option<String>,
    /// Only ever read from the config file or `FTI_DASHBOARD_PASSWORD`.
    pub password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            state_path: "config/dashboard_state.json".to_string(),
            refresh_interval_secs: 30,
            log_level: "info".to_string(),
            email: None,
            password: None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fti_dashboard", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:5000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the local state file (credential and cached categories).
    #[arg(long)]
    state_path: Option<String>,
    /// Override the background refresh period, in seconds.
    #[arg(long)]
    refresh_interval_secs: Option<u64>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
    /// Email used to log in when no credential is stored (password is never
    /// read from CLI).
    #[arg(long)]
    email: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FTI_DASHBOARD"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(secs) = args.refresh_interval_secs {
        settings.refresh_interval_secs = secs;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(email) = args.email {
        settings.email = Some(email);
    }
    settings.refresh_interval_secs = settings.refresh_interval_secs.max(1);

    Ok(settings)
}
