// src/config.rs
//! Credential resolution: environment variables first, local file second.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{info, warn};

/// Overrides where the fallback file lives (useful for tests and local runs).
pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const ENV_GEMINI_KEY: &str = "GEMINI_API_KEY";
const ENV_SUPABASE_URL: &str = "SUPABASE_PROJECT_URL";
const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";

/// The three credentials every run needs. The fallback file uses the same
/// key names as the environment variables, so one schema covers both sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secrets {
    #[serde(rename = "GEMINI_API_KEY")]
    pub gemini_api_key: String,
    #[serde(rename = "SUPABASE_PROJECT_URL")]
    pub supabase_project_url: String,
    #[serde(rename = "SUPABASE_KEY")]
    pub supabase_key: String,
}

impl Secrets {
    /// All three values from the environment, or nothing. No partial merge
    /// with the file source: a single missing variable falls through.
    pub fn from_env() -> Option<Self> {
        let read = |key: &str| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(Self {
            gemini_api_key: read(ENV_GEMINI_KEY)?,
            supabase_project_url: read(ENV_SUPABASE_URL)?,
            supabase_key: read(ENV_SUPABASE_KEY)?,
        })
    }

    /// Parse the fallback file. Format is picked by extension: `.toml` is
    /// TOML, anything else is JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("no configuration found at {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let secrets: Secrets = if ext == "toml" {
            toml::from_str(&content)
                .with_context(|| format!("invalid TOML in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        };
        secrets.validate()?;
        Ok(secrets)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            (ENV_GEMINI_KEY, &self.gemini_api_key),
            (ENV_SUPABASE_URL, &self.supabase_project_url),
            (ENV_SUPABASE_KEY, &self.supabase_key),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("configuration value {key} is empty"));
            }
        }
        Ok(())
    }
}

/// Fallback file location: `$PIPELINE_CONFIG_PATH`, else `config.json`.
pub fn fallback_config_path() -> PathBuf {
    env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn missing_env_keys() -> Vec<&'static str> {
    [ENV_GEMINI_KEY, ENV_SUPABASE_URL, ENV_SUPABASE_KEY]
        .into_iter()
        .filter(|key| {
            env::var(key)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .collect()
}

/// Ordered source list: environment, then the fallback file. The first
/// fully-populated source wins; no network call happens before this returns.
pub fn resolve_secrets() -> Result<Secrets> {
    if let Some(secrets) = Secrets::from_env() {
        info!("using credentials from environment variables");
        return Ok(secrets);
    }
    let path = fallback_config_path();
    warn!(
        "missing environment variables: {}; falling back to {}",
        missing_env_keys().join(", "),
        path.display()
    );
    let secrets = Secrets::from_file(&path)?;
    info!("using credentials from {}", path.display());
    Ok(secrets)
}
