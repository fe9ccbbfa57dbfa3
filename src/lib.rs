//! # image-analyzer
//!
//! A single-page web form that sends an uploaded image to a vision LLM and
//! shows the model's answer.
//!
//! ## Request Overview
//!
//! ```text
//! POST / (multipart: image, task_type)
//!  │
//!  ├─ 1. Form     extract the file and task selector
//!  ├─ 2. Encode   decode any format → JPEG → base64 data URL (spawn_blocking)
//!  ├─ 3. Prompt   pick one of four fixed prompts for the task
//!  ├─ 4. VLM      one POST to an OpenRouter-style chat-completions endpoint
//!  └─ 5. Render   HTML page with the text or a single error string
//! ```
//!
//! Nothing persists between requests and nothing is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_analyzer::{server, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // OPENROUTER_API_KEY, OPENROUTER_MODEL, OPENROUTER_URL, APP_URL, APP_TITLE
//!     let config = AnalyzerConfig::from_env()?;
//!     let state = server::AppState::new(config)?;
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     server::serve(listener, state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `image-analyzer` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, Analysis};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use error::AnalyzerError;
pub use prompts::TaskType;
