//! Single-image analysis entry point.
//!
//! [`analyze`] runs the whole request cycle in order: normalise the upload,
//! check credentials, build the multimodal request, call the model. The web
//! handler in [`crate::server`] is a thin shim over this function, and the
//! function is usable without the server.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::{encode, llm};
use crate::prompts::TaskType;
use image::ImageFormat;
use std::time::Instant;
use tracing::{debug, info};

/// Result of one successful analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Model text, or the raw response when the content path was missing.
    pub text: String,
    pub task: TaskType,
    pub model: String,
    /// Detected upload format, e.g. `"png"`.
    pub source_format: Option<String>,
    pub elapsed_ms: u64,
}

/// Analyse one uploaded image.
///
/// # Errors
/// - [`AnalyzerError::UnsupportedImage`] when the bytes are not a decodable image
/// - [`AnalyzerError::MissingApiKey`] when no key is configured (checked after
///   the image is validated, before any network activity)
/// - [`AnalyzerError::Request`], [`AnalyzerError::UpstreamStatus`],
///   [`AnalyzerError::InvalidResponse`] from the outbound call
///
/// # Example
/// ```rust,no_run
/// use image_analyzer::{analyze, AnalyzerConfig, TaskType};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AnalyzerConfig::from_env()?;
/// let client = config.http_client()?;
/// let bytes = std::fs::read("photo.png")?;
/// let analysis = analyze(&client, &config, bytes, TaskType::Scan).await?;
/// println!("{}", analysis.text);
/// # Ok(())
/// # }
/// ```
pub async fn analyze(
    client: &reqwest::Client,
    config: &AnalyzerConfig,
    image_bytes: Vec<u8>,
    task: TaskType,
) -> Result<Analysis, AnalyzerError> {
    let start = Instant::now();
    info!(
        "Analysing {} byte upload (task: {}, model: {})",
        image_bytes.len(),
        task,
        config.model
    );

    // ── Step 1: Normalise to JPEG ────────────────────────────────────────
    let image = encode::normalize_image_async(image_bytes, config.jpeg_quality).await?;

    // ── Step 2: Credentials ──────────────────────────────────────────────
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(AnalyzerError::MissingApiKey)?;

    // ── Step 3: Build request ────────────────────────────────────────────
    let request = llm::build_request(task.prompt(), image.data_url(), config);

    // ── Step 4: Call the model ───────────────────────────────────────────
    let text = llm::call_model(client, config, api_key, &request).await?;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("Model returned {} chars", text.len());
    info!("Analysis complete in {}ms", elapsed_ms);

    Ok(Analysis {
        text,
        task,
        model: config.model.clone(),
        source_format: image.source_format.map(format_name),
        elapsed_ms,
    })
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| format!("{format:?}").to_lowercase())
}
