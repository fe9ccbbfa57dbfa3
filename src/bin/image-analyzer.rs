//! CLI binary for image-analyzer.
//!
//! A thin shim over the library crate: loads `.env`, maps flags onto
//! `AnalyzerConfig`, sets up logging and serves the form.

use anyhow::{Context, Result};
use clap::Parser;
use image_analyzer::config::{ENV_ENDPOINT_URL, ENV_MODEL};
use image_analyzer::server::{self, AppState};
use image_analyzer::AnalyzerConfig;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (http://127.0.0.1:5000)
  image-analyzer

  # Listen on all interfaces, port 8080
  image-analyzer --bind 0.0.0.0:8080

  # Use another model for this run
  image-analyzer --model openai/gpt-4.1-mini

ENVIRONMENT VARIABLES (also read from ./.env):
  OPENROUTER_API_KEY         Bearer token for the inference API (required to analyse)
  OPENROUTER_MODEL           Model slug            [default: x-ai/grok-4.1-fast:free]
  OPENROUTER_URL             Chat-completions URL  [default: https://openrouter.ai/api/v1/chat/completions]
  APP_URL                    HTTP-Referer header   [default: http://localhost:5000]
  APP_TITLE                  X-Title header / page title [default: AI Image Analyzer]
  ANALYZER_MAX_TOKENS        max_tokens per request [default: 800]
  ANALYZER_JPEG_QUALITY      JPEG quality 1-100     [default: 90]
  ANALYZER_REQUEST_TIMEOUT   Outbound timeout in seconds [default: none]
  ANALYZER_MAX_UPLOAD_BYTES  Upload size limit      [default: 16777216]
"#;

/// Serve a web form that analyses uploaded images with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "image-analyzer",
    version,
    about = "Serve a web form that analyses uploaded images with a vision LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "ANALYZER_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Override OPENROUTER_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Override OPENROUTER_URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANALYZER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ANALYZER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap so `env = ...` attributes see its values.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli).context("Invalid configuration")?;
    if !config.has_api_key() {
        warn!("OPENROUTER_API_KEY is not set; every analysis will fail until it is configured");
    }
    info!("Using model {} at {}", config.model, config.endpoint_url);

    let state = AppState::new(config).context("Failed to initialise HTTP client")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;

    server::serve(listener, state)
        .await
        .context("Server error")?;

    Ok(())
}

/// Environment, with CLI flags taking precedence.
fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let config = AnalyzerConfig::from_env_with(|key| match key {
        ENV_MODEL => cli.model.clone(),
        ENV_ENDPOINT_URL => cli.endpoint.clone(),
        _ => None,
    })?;
    Ok(config)
}
