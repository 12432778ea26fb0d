// src/publish.rs
//! Database publisher: one row per run into the `post_pipeline` table via
//! the Supabase REST interface. No retries, no dedup key; re-running the
//! same query inserts a duplicate row.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::generate::PostContent;

/// Label stored with rows created by scheduled runs.
pub const DEFAULT_SOURCE: &str = "github_actions";

const INSERT_PATH: &str = "/rest/v1/post_pipeline";

/// Envelope plus source label, as transmitted to the insert endpoint.
#[derive(Debug, Serialize)]
pub struct PublishPayload<'a> {
    pub post: &'a PostContent,
    pub source: &'a str,
}

/// The stored row as returned under `Prefer: return=representation`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InsertedRow {
    pub id: i64,
    pub created_at: String,
    pub source: String,
    pub post: PostContent,
}

/// Persistence seam for the pipeline; the remote table owns rows after insert.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: &PostContent, source: &str) -> Result<InsertedRow>;
}

pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: reqwest::Client::new(),
        }
    }

    fn insert_url(&self) -> String {
        format!("{}{INSERT_PATH}", self.base_url)
    }
}

#[async_trait::async_trait]
impl PostStore for SupabaseStore {
    async fn insert(&self, post: &PostContent, source: &str) -> Result<InsertedRow> {
        let payload = PublishPayload { post, source };

        let resp = self
            .http
            .post(self.insert_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .context("posting to supabase")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!("supabase returned {status}: {body}"));
        }
        parse_inserted(&body)
    }
}

/// The endpoint answers with a JSON array holding the single inserted row.
fn parse_inserted(body: &str) -> Result<InsertedRow> {
    let rows: Vec<InsertedRow> = serde_json::from_str(body)
        .with_context(|| format!("unexpected insert response: {body}"))?;
    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow!("insert response was an empty array"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> PostContent {
        PostContent {
            query: "topic X".into(),
            generated_at: "2024-06-02T08:00:00+00:00".into(),
            model: "gemini-2.0-flash-exp".into(),
            content: "Hello world".into(),
            search_date_range: "2024-06-01 to 2024-06-02".into(),
            prompt_version: "template_v1".into(),
        }
    }

    #[test]
    fn payload_has_post_and_source_keys() {
        let post = sample_post();
        let payload = PublishPayload {
            post: &post,
            source: DEFAULT_SOURCE,
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["source"], "github_actions");
        assert_eq!(v["post"]["content"], "Hello world");
        assert_eq!(v["post"]["prompt_version"], "template_v1");
    }

    #[test]
    fn representation_array_parses_to_first_row() {
        let post = serde_json::to_string(&sample_post()).unwrap();
        let body = format!(
            r#"[{{"id":42,"created_at":"2024-06-02T08:00:01+00:00","source":"github_actions","post":{post}}}]"#
        );
        let row = parse_inserted(&body).unwrap();
        assert_eq!(row.id, 42);
        assert_eq!(row.source, "github_actions");
        assert_eq!(row.post.content, "Hello world");
    }

    #[test]
    fn empty_or_malformed_response_is_an_error() {
        assert!(parse_inserted("[]").is_err());
        assert!(parse_inserted("{\"oops\":true}").is_err());
        assert!(parse_inserted("not json").is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let store = SupabaseStore::new("https://x.supabase.co/".into(), "k".into());
        assert_eq!(
            store.insert_url(),
            "https://x.supabase.co/rest/v1/post_pipeline"
        );
    }
}
