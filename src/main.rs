//! Daily AI Post Pipeline: Binary Entrypoint
//! Resolves credentials, generates one post with Gemini, inserts it into
//! the Supabase `post_pipeline` table, then exits. Meant to be triggered by
//! an external scheduler; exit status 0 on success, 1 on any failure.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use daily_post_pipeline::config::resolve_secrets;
use daily_post_pipeline::generate::GeminiProvider;
use daily_post_pipeline::pipeline::{self, RunPaths};
use daily_post_pipeline::publish::{SupabaseStore, DEFAULT_SOURCE};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the scheduler injects real env vars.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("starting daily AI post pipeline");

    let secrets = match resolve_secrets() {
        Ok(s) => s,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let provider = GeminiProvider::new(secrets.gemini_api_key);
    let store = SupabaseStore::new(secrets.supabase_project_url, secrets.supabase_key);

    match pipeline::run(&provider, &store, DEFAULT_SOURCE, &RunPaths::default()).await {
        Ok(row) => {
            info!("successfully posted to database");
            info!("record id: {}", row.id);
            info!("created at: {}", row.created_at);
            info!("source: {}", row.source);
            info!("pipeline completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
