//! Configuration for the analyzer: inference endpoint, credentials and limits.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built either from
//! the process environment ([`AnalyzerConfig::from_env`]) or explicitly via
//! [`AnalyzerConfigBuilder`]. The config is loaded once at startup and shared
//! read-only by every request.

use crate::error::AnalyzerError;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Default model slug on OpenRouter.
pub const DEFAULT_MODEL: &str = "x-ai/grok-4.1-fast:free";

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default value of the `HTTP-Referer` header.
pub const DEFAULT_APP_URL: &str = "http://localhost:5000";

/// Default value of the `X-Title` header and the page title.
pub const DEFAULT_APP_TITLE: &str = "AI Image Analyzer";

/// Default completion budget per request.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Default JPEG quality for the normalised upload.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default maximum accepted request body (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

// Environment variable names.
pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "OPENROUTER_MODEL";
pub const ENV_ENDPOINT_URL: &str = "OPENROUTER_URL";
pub const ENV_APP_URL: &str = "APP_URL";
pub const ENV_APP_TITLE: &str = "APP_TITLE";
pub const ENV_MAX_TOKENS: &str = "ANALYZER_MAX_TOKENS";
pub const ENV_JPEG_QUALITY: &str = "ANALYZER_JPEG_QUALITY";
pub const ENV_REQUEST_TIMEOUT: &str = "ANALYZER_REQUEST_TIMEOUT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "ANALYZER_MAX_UPLOAD_BYTES";

/// Configuration shared by every analysis request.
///
/// # Example
/// ```rust
/// use image_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .api_key("sk-or-test")
///     .model("openai/gpt-4.1-mini")
///     .max_tokens(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 500);
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Bearer token for the inference API. `None` makes every analysis fail
    /// with [`AnalyzerError::MissingApiKey`].
    pub api_key: Option<String>,

    /// Model identifier sent in the request body.
    pub model: String,

    /// Full URL of the chat-completions endpoint.
    pub endpoint_url: String,

    /// Sent as `HTTP-Referer`; OpenRouter uses it for app attribution.
    pub app_url: String,

    /// Sent as `X-Title` and shown as the page title.
    pub app_title: String,

    /// `max_tokens` in the request body. Default: 800.
    pub max_tokens: u32,

    /// JPEG quality (1–100) used when normalising the upload. Default: 90.
    pub jpeg_quality: u8,

    /// Whole-request timeout for the outbound call. `None` keeps the HTTP
    /// client's default (no timeout).
    pub request_timeout_secs: Option<u64>,

    /// Largest accepted multipart body in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            request_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint_url", &self.endpoint_url)
            .field("app_url", &self.app_url)
            .field("app_title", &self.app_title)
            .field("max_tokens", &self.max_tokens)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if values should come from a `.env` file.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from the process environment, letting `overrides`
    /// win for any key it answers with a non-empty value.
    ///
    /// Validation runs once, on the merged values, so an override can
    /// replace a bad environment value.
    pub fn from_env_with<F>(overrides: F) -> Result<Self, AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(layered(overrides, |key: &str| std::env::var(key).ok()))
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Empty values count as unset. Numeric values that fail to parse are
    /// ignored with a warning and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(key) = get(ENV_API_KEY) {
            builder = builder.api_key(key.trim());
        }
        if let Some(model) = get(ENV_MODEL) {
            builder = builder.model(model.trim());
        }
        if let Some(url) = get(ENV_ENDPOINT_URL) {
            builder = builder.endpoint_url(url.trim());
        }
        if let Some(app_url) = get(ENV_APP_URL) {
            builder = builder.app_url(app_url);
        }
        if let Some(title) = get(ENV_APP_TITLE) {
            builder = builder.app_title(title);
        }
        if let Some(n) = parse_var::<u32>(ENV_MAX_TOKENS, get(ENV_MAX_TOKENS)) {
            builder = builder.max_tokens(n);
        }
        if let Some(q) = parse_var::<u8>(ENV_JPEG_QUALITY, get(ENV_JPEG_QUALITY)) {
            builder = builder.jpeg_quality(q);
        }
        if let Some(secs) = parse_var::<u64>(ENV_REQUEST_TIMEOUT, get(ENV_REQUEST_TIMEOUT)) {
            builder = builder.request_timeout_secs(secs);
        }
        if let Some(n) = parse_var::<usize>(ENV_MAX_UPLOAD_BYTES, get(ENV_MAX_UPLOAD_BYTES)) {
            builder = builder.max_upload_bytes(n);
        }

        builder.build()
    }

    /// Whether a non-empty API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Build the HTTP client used for the outbound call.
    pub fn http_client(&self) -> Result<reqwest::Client, AnalyzerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| AnalyzerError::Internal(format!("Failed to create HTTP client: {e}")))
    }
}

/// Consult `first`, then `second` for keys `first` leaves unset or empty.
fn layered<A, B>(first: A, second: B) -> impl Fn(&str) -> Option<String>
where
    A: Fn(&str) -> Option<String>,
    B: Fn(&str) -> Option<String>,
{
    move |key: &str| {
        first(key)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| second(key))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self
    }

    pub fn app_url(mut self, url: impl Into<String>) -> Self {
        self.config.app_url = url.into();
        self
    }

    pub fn app_title(mut self, title: impl Into<String>) -> Self {
        self.config.app_title = title.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.endpoint_url.starts_with("http://") || c.endpoint_url.starts_with("https://")) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "endpoint URL must start with http:// or https://, got '{}'",
                c.endpoint_url
            )));
        }
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
