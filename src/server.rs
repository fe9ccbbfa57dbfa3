//! HTTP surface: `GET /` shows the form, `POST /` analyses an upload.
//!
//! Every outcome of a POST, including malformed multipart bodies and
//! oversized uploads, renders the page with an error block and `200 OK`.
//! Nothing a client sends can take the handler down.

use crate::analyze::analyze;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::page::{render_page, PageView};
use crate::prompts::TaskType;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Form field carrying the image file.
pub const IMAGE_FIELD: &str = "image";

/// Form field carrying the task selector.
pub const TASK_FIELD: &str = "task_type";

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalyzerConfig>,
    pub client: reqwest::Client,
}

impl AppState {
    /// Build state from a config, creating the HTTP client.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let client = config.http_client()?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

/// The submitted form after multipart parsing.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// File bytes; `None` when no file was chosen.
    pub image: Option<Vec<u8>>,
    pub task: TaskType,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index).post(submit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on an already-bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageView {
        title: &state.config.app_title,
        ..Default::default()
    }))
}

async fn submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };

    let (task, outcome) = match form {
        Ok(form) => {
            let task = form.task;
            (task, run_analysis(&state, form).await)
        }
        Err(detail) => {
            warn!("Unreadable upload: {}", detail);
            (
                TaskType::default(),
                Err(format!("Could not read the upload: {detail}")),
            )
        }
    };

    let (result, error) = match &outcome {
        Ok(text) => (Some(text.as_str()), None),
        Err(msg) => (None, Some(msg.as_str())),
    };

    Html(render_page(&PageView {
        title: &state.config.app_title,
        task,
        result,
        error,
    }))
}

/// Run the analysis and turn the outcome into page text.
async fn run_analysis(state: &AppState, form: UploadForm) -> Result<String, String> {
    let Some(image) = form.image else {
        return Err(AnalyzerError::MissingImage.to_string());
    };

    match analyze(&state.client, &state.config, image, form.task).await {
        Ok(analysis) => Ok(analysis.text),
        Err(e) => {
            warn!("Analysis failed: {}", e);
            Err(format!("Error during analysis: {e}"))
        }
    }
}

/// Collect the `image` and `task_type` fields, ignoring anything else.
///
/// A file part with an empty filename or empty body is what browsers send
/// when no file was chosen; it is treated as absent.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, String> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let has_filename = field.file_name().is_some_and(|n| !n.is_empty());
                if !has_filename {
                    continue;
                }
                let bytes = field.bytes().await.map_err(|e| e.body_text())?;
                if !bytes.is_empty() {
                    form.image = Some(bytes.to_vec());
                }
            }
            Some(TASK_FIELD) => {
                let value = field.text().await.map_err(|e| e.body_text())?;
                form.task = TaskType::from_selector(&value);
            }
            _ => {}
        }
    }

    Ok(form)
}
