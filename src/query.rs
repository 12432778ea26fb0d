// src/query.rs
//! Topic query and prompt template loading, plus placeholder substitution.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_QUERY_PATH: &str = "query.txt";
pub const DEFAULT_TEMPLATE_PATH: &str = "prompt_template.txt";

/// Used when no `prompt_template.txt` override exists. Placeholders:
/// `{query}`, `{current_date}`, `{yesterday}`.
pub const DEFAULT_TEMPLATE: &str = "\
Please provide the latest information and developments about '{query}' from the last 24 hours (since {yesterday}).

Focus on recent news, updates, technical developments, and community insights.

Please structure your response with:
- Title: A catchy title for the update
- Summary: Brief overview of key developments
- Key Points: Bullet points of important updates
- Technical Details: Any technical information or examples

Current date: {current_date}
Query: {query}
Time range: Last 24 hours
";

static LEFTOVER_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[a-z_]+\}").expect("placeholder regex"));

/// Read and trim the topic query. A missing file or whitespace-only content
/// is fatal for the run.
pub fn load_query_from(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("query file {} not found", path.display()))?;
    let query = raw.trim();
    if query.is_empty() {
        return Err(anyhow!("query file {} is empty", path.display()));
    }
    Ok(query.to_string())
}

/// Best-effort template override: any read failure falls back to the
/// built-in template with a warning.
pub fn load_template_from(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            warn!(
                "{} not found, using default prompt template",
                path.display()
            );
            DEFAULT_TEMPLATE.to_string()
        }
    }
}

/// Splice the query and date values into the template placeholders.
pub fn render_prompt(template: &str, query: &str, current_date: &str, yesterday: &str) -> String {
    let prompt = template
        .replace("{query}", query)
        .replace("{current_date}", current_date)
        .replace("{yesterday}", yesterday);
    if let Some(m) = LEFTOVER_PLACEHOLDER.find(&prompt) {
        warn!("template placeholder {} was not expanded", m.as_str());
    }
    prompt
}
