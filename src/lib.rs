// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod generate;
pub mod pipeline;
pub mod publish;
pub mod query;

// ---- Re-exports for stable public API ----
pub use config::{resolve_secrets, Secrets};
pub use generate::{generate_post, GeminiProvider, PostContent, TextProvider};
pub use publish::{InsertedRow, PostStore, SupabaseStore, DEFAULT_SOURCE};
