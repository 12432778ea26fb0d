// src/pipeline.rs
//! Wires the stages in order: query, generate, publish. Each stage is a hard
//! dependency on the previous one succeeding; the first error aborts the run
//! and the generated content is discarded, never cached for a later attempt.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::generate::{generate_post, TextProvider};
use crate::publish::{InsertedRow, PostStore};
use crate::query::{
    load_query_from, load_template_from, DEFAULT_QUERY_PATH, DEFAULT_TEMPLATE_PATH,
};

const PREVIEW_CHARS: usize = 150;

/// Input file locations, overridable for tests.
pub struct RunPaths<'a> {
    pub query: &'a Path,
    pub template: &'a Path,
}

impl Default for RunPaths<'static> {
    fn default() -> Self {
        Self {
            query: Path::new(DEFAULT_QUERY_PATH),
            template: Path::new(DEFAULT_TEMPLATE_PATH),
        }
    }
}

/// One full run. Returns the stored row for the final status lines.
pub async fn run(
    provider: &dyn TextProvider,
    store: &dyn PostStore,
    source: &str,
    paths: &RunPaths<'_>,
) -> Result<InsertedRow> {
    let query = load_query_from(paths.query)?;
    info!("loaded query: {query}");

    let template = load_template_from(paths.template);
    let post = generate_post(provider, &query, &template)
        .await
        .context("failed to generate content")?;
    info!("content generated, preview: {}", preview(&post.content));

    info!("posting to database");
    store
        .insert(&post, source)
        .await
        .context("failed to post to database")
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if out.len() < text.len() {
        out.push_str("...");
    }
    out
}
