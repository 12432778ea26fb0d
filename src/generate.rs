// src/generate.rs
//! Content generator: date window, prompt assembly, and the Gemini provider
//! behind a trait seam so the pipeline is testable without a live API.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::query::render_prompt;

/// Model invoked for every run; `PostContent::model` always matches it.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
/// Stored with each post so downstream readers know which template shaped it.
pub const PROMPT_VERSION: &str = "template_v1";

/// One generated post with its metadata, destined for storage.
/// Created once per run and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostContent {
    pub query: String,
    pub generated_at: String,
    pub model: String,
    pub content: String,
    pub search_date_range: String,
    pub prompt_version: String,
}

/// Prompt in, completion text out. Implementations own transport details.
#[async_trait::async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    /// Model identifier for diagnostics and envelope metadata.
    fn model(&self) -> &'static str;
}

/// Gemini `generateContent` provider. Requires an API key; uses the HTTP
/// client's default timeouts.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait::async_trait]
impl TextProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{GEMINI_MODEL}:generateContent"
        );
        let req = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("gemini returned {status}: {body}"));
        }
        let body: GenerateResponse = resp.json().await.context("gemini response parse")?;
        extract_text(body).ok_or_else(|| anyhow!("gemini response contained no text"))
    }

    fn model(&self) -> &'static str {
        GEMINI_MODEL
    }
}

fn extract_text(resp: GenerateResponse) -> Option<String> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Local calendar dates for today and yesterday as `YYYY-MM-DD`.
fn date_window() -> (String, String) {
    let now = Local::now();
    let today = now.format("%Y-%m-%d").to_string();
    let yesterday = (now - Duration::days(1)).format("%Y-%m-%d").to_string();
    (today, yesterday)
}

/// Assemble the prompt, call the provider, and wrap the completion with its
/// metadata. The generation timestamp is captured here, at call time.
pub async fn generate_post(
    provider: &dyn TextProvider,
    query: &str,
    template: &str,
) -> Result<PostContent> {
    let (today, yesterday) = date_window();
    let prompt = render_prompt(template, query, &today, &yesterday);

    info!(model = provider.model(), "generating content");
    let content = provider.generate(&prompt).await?;

    Ok(PostContent {
        query: query.to_string(),
        generated_at: Local::now().to_rfc3339(),
        model: provider.model().to_string(),
        content,
        search_date_range: format!("{yesterday} to {today}"),
        prompt_version: PROMPT_VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        text: &'static str,
    }

    #[async_trait::async_trait]
    impl TextProvider for FixedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.text.to_string())
        }
        fn model(&self) -> &'static str {
            GEMINI_MODEL
        }
    }

    #[test]
    fn response_text_is_joined_from_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hello world");
    }

    #[test]
    fn empty_candidates_yield_none() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(resp).is_none());

        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_text(resp).is_none());
    }

    #[tokio::test]
    async fn envelope_wraps_completion_with_metadata() {
        let provider = FixedProvider {
            text: "Hello world",
        };
        let post = generate_post(&provider, "LLM safety", "about {query}")
            .await
            .unwrap();

        assert_eq!(post.query, "LLM safety");
        assert_eq!(post.content, "Hello world");
        assert_eq!(post.model, GEMINI_MODEL);
        assert_eq!(post.prompt_version, PROMPT_VERSION);

        let (today, yesterday) = date_window();
        assert_eq!(post.search_date_range, format!("{yesterday} to {today}"));
        // generated_at is RFC 3339 and carries a date component
        assert!(post.generated_at.starts_with(&today));
    }

    #[tokio::test]
    async fn provider_error_propagates_without_an_envelope() {
        struct FailingProvider;

        #[async_trait::async_trait]
        impl TextProvider for FailingProvider {
            async fn generate(&self, _prompt: &str) -> Result<String> {
                Err(anyhow!("quota exceeded"))
            }
            fn model(&self) -> &'static str {
                GEMINI_MODEL
            }
        }

        let err = generate_post(&FailingProvider, "topic", "t {query}")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
