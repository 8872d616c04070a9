use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::cli::ServeArgs;
use crate::core::detection::{
    partial_read_boxes, table_read_boxes, Game, PARTIAL_READ_NOTE, TABLE_READ_NOTE,
};
use crate::storage::{SavedUpload, StorageError, UploadStore};
use crate::utils::validation::is_image_mime;
use crate::web::listener::bind_with_retry;

/// Request body cap; accommodates a large webcam frame plus multipart overhead
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024; // 20MB

/// Shared application state
pub struct AppState {
    pub store: UploadStore,

    /// Port the listener actually bound, injected at startup and read by /meta
    pub port: u16,

    /// Whether the declared-MIME gate on uploads is enabled
    pub enforce_validation: bool,
}

/// Uniform error payload: `{"error": "..."}`
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON body accepted by the mock CV endpoint
#[derive(Deserialize)]
struct MockCvRequest {
    filename: Option<String>,
}

/// One multipart image field: bytes plus whatever the client declared
struct ImageField {
    bytes: axum::body::Bytes,
    filename: Option<String>,
    content_type: Option<String>,
}

/// Build a `(status, {"error": ...})` response.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn not_found_response() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

/// Run the web server.
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created, the upload
/// directory cannot be prepared, or no port can be bound within the attempt
/// limit. The caller exits non-zero.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let store = UploadStore::new(&args.upload_dir);
    store.ensure_root().await?;

    let bound = bind_with_retry(args.address, args.port, args.attempts).await?;
    let port = bound.port();

    let state = Arc::new(AppState {
        store,
        port,
        enforce_validation: args.enforce_validation,
    });
    let app = build_router(state);

    println!(
        "card-spotter backend listening on http://{}:{port}",
        args.address
    );

    if args.open {
        let _ = open::that(format!("http://{}:{port}", args.address));
    }

    axum::serve(bound.into_inner(), app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware configured.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/meta", get(meta_handler))
        .route("/upload", post(upload_handler))
        .route("/mock-cv", post(mock_cv_handler))
        .route("/analyze", post(analyze_handler))
        .route("/uploads/{file}", get(serve_upload_handler))
        // Static file routes for the capture page
        .route("/static/js/capture.js", get(capture_js_handler))
        .route("/static/css/styles.css", get(styles_css_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Uploads are served back with client-influenced types
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

/// Capture page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

async fn capture_js_handler() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        include_str!("static/js/capture.js"),
    )
}

async fn styles_css_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("static/css/styles.css"),
    )
}

/// Liveness probe; answers regardless of any other server state
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Introspection: the actually-bound port, upload directory, and version
async fn meta_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "port": state.port,
        "uploadDir": state.store.root().display().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Accept a multipart `image` field and persist it
async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let Some(field) = extract_image_field(&mut multipart).await else {
        return error_response(StatusCode::BAD_REQUEST, "no file uploaded");
    };

    match store_image(&state, field).await {
        Ok(saved) => Json(serde_json::json!({
            "filename": saved.filename,
            "path": format!("/uploads/{}", saved.filename),
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

/// Mock CV results for a previously uploaded file.
///
/// The response is independent of the filename value: a fixed table read
/// until a real detector exists.
async fn mock_cv_handler(body: axum::body::Bytes) -> Response {
    // Absent or unparseable bodies behave like an empty object.
    let filename = serde_json::from_slice::<MockCvRequest>(&body)
        .ok()
        .and_then(|req| req.filename)
        .filter(|name| !name.is_empty());

    let Some(filename) = filename else {
        return error_response(StatusCode::BAD_REQUEST, "filename required");
    };

    Json(serde_json::json!({
        "filename": filename,
        "boxes": table_read_boxes(),
        "game": Game::Poker,
        "note": TABLE_READ_NOTE,
    }))
    .into_response()
}

/// One-shot variant: accept a fresh upload and answer with mock boxes
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let Some(field) = extract_image_field(&mut multipart).await else {
        return error_response(StatusCode::BAD_REQUEST, "no file uploaded");
    };

    match store_image(&state, field).await {
        Ok(saved) => Json(serde_json::json!({
            "filename": saved.filename,
            "boxes": partial_read_boxes(),
            "game": Game::Poker,
            "note": PARTIAL_READ_NOTE,
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

/// Serve a stored upload back as raw bytes
async fn serve_upload_handler(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Response {
    match state.store.read(&file).await {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, content_type_for(&file))], bytes).into_response()
        }
        // Invalid names can never exist; answer exactly like a missing file.
        Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => not_found_response(),
        Err(e) => {
            tracing::error!("failed to read upload {file}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read upload")
        }
    }
}

/// Uniform 404 JSON for anything unmatched
async fn fallback_handler() -> Response {
    not_found_response()
}

/// Pull the first field named `image` out of a multipart request.
///
/// Field metadata is captured before the bytes are consumed. A malformed
/// multipart stream yields `None`, which callers answer with 400.
async fn extract_image_field(multipart: &mut Multipart) -> Option<ImageField> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().map(std::string::ToString::to_string);
        let content_type = field.content_type().map(std::string::ToString::to_string);

        return match field.bytes().await {
            Ok(bytes) => Some(ImageField {
                bytes,
                filename,
                content_type,
            }),
            Err(_) => None,
        };
    }
    None
}

/// Persist an image field, applying the declared-MIME gate when enabled.
///
/// Bytes hit disk before the gate runs; a rejected upload is deleted again.
/// The gate trusts the client's declared type and never inspects content.
async fn store_image(state: &AppState, field: ImageField) -> Result<SavedUpload, Response> {
    let size = field.bytes.len();

    let saved = match state.store.save(field.filename.as_deref(), &field.bytes).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::error!("failed to persist upload: {e}");
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to store upload",
            ));
        }
    };

    if state.enforce_validation && !is_image_mime(field.content_type.as_deref()) {
        // Removal failures are swallowed; the rejection stands either way.
        let _ = state.store.remove(&saved.filename).await;
        tracing::warn!(
            "rejected upload with declared type {:?}",
            field.content_type.as_deref()
        );
        return Err(error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "only image uploads are accepted",
        ));
    }

    tracing::info!("stored upload {} ({size} bytes)", saved.filename);
    tracing::debug!("upload written to {}", saved.fs_path.display());
    Ok(saved)
}

/// Map a stored filename's extension to a content type for serving
fn content_type_for(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_body_limit_fits_webcam_frames() {
        // A 1080p JPEG frame is well under a megabyte; leave generous headroom.
        assert!(MAX_BODY_BYTES >= 10 * 1024 * 1024);
    }
}
