use crate::error::AppError;
use crate::form::Form;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use pdf_tools::operations::{
    delete_pdf_pages, image_file_to_pdf, image_to_pdf, merge_documents, merge_pdf_files,
    reencode_pdf_file, reorder_pdf_pages, rotate_pdf_file, split_pdf,
};
use pdf_tools::{
    ocr_text, DeleteSet, Document, DocumentKind, OrderList, PdfToolsError, RangeList, Rotation,
    TempWorkspace, Upload, UploadedFile,
};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Multipart field names accepted for multi-file uploads
const FILES_FIELDS: &[&str] = &["files", "files[]"];
const FILE_FIELD: &str = "file";

/// Response for the root endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for text recognition
#[derive(Debug, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Recognised text, exactly as the engine produced it
    pub text: String,
}

/// Build the application router with all routes configured
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // PDF operations
        .route("/pdf/merge", post(merge_pdfs))
        .route("/pdf/split", post(split_first_part))
        .route("/pdf/split/archive", post(split_archive))
        .route("/pdf/rotate", post(rotate_pdf))
        .route("/pdf/reorder", post(reorder_pdf))
        .route("/pdf/delete-pages", post(delete_pages))
        .route("/pdf/compress", post(compress_pdf))
        // Mixed inputs
        .route("/file/merge", post(merge_files))
        .route("/image/to-pdf", post(image_to_pdf_handler))
        .route("/ocr/image-to-text", post(image_to_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "PDF Tools API is running".to_string(),
    })
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "PDF Tools API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Merge multiple PDF files into a single PDF
pub async fn merge_pdfs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let uploads = form.take_files(FILES_FIELDS);
    if uploads.is_empty() {
        return Err(AppError::missing_field("files"));
    }
    info!(files = uploads.len(), "Merging PDFs");

    let merged = run_pipeline(&state, move |workspace| {
        let inputs = workspace.persist_uploads(&uploads)?;
        let output = workspace.allocate(".pdf")?;
        merge_pdf_files(&inputs, &output)?;
        Ok(std::fs::read(&output)?)
    })
    .await?;

    Ok(pdf_response(merged, "merged.pdf"))
}

/// Split a PDF by page ranges and return the first part
pub async fn split_first_part(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let first = split_parts(&state, multipart)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::invalid_field("ranges"))?;
    Ok(pdf_response(first, "split_part1.pdf"))
}

/// Split a PDF by page ranges and return every part in a zip archive
pub async fn split_archive(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let parts = split_parts(&state, multipart).await?;
    let archive = zip_parts(&parts)?;

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "application/zip"),
            ("Content-Disposition", "attachment; filename=\"split.zip\""),
        ],
        archive,
    )
        .into_response())
}

/// Rotate all pages of a PDF by a multiple of 90 degrees
pub async fn rotate_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let degrees: i64 = form.parse("rotation")?;
    let rotation = Rotation::from_degrees(degrees)?;
    let upload = form.take_file(FILE_FIELD)?;

    let rotated = single_file_pipeline(&state, upload, move |input, output| {
        rotate_pdf_file(input, rotation.degrees(), output)
    })
    .await?;

    Ok(pdf_response(rotated, "rotated.pdf"))
}

/// Rewrite a PDF with its pages in a new 1-based order
pub async fn reorder_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let order: OrderList = form.parse("new_order")?;
    let upload = form.take_file(FILE_FIELD)?;

    let reordered = single_file_pipeline(&state, upload, move |input, output| {
        reorder_pdf_pages(input, &order, output)
    })
    .await?;

    Ok(pdf_response(reordered, "reordered.pdf"))
}

/// Remove 1-based pages from a PDF
pub async fn delete_pages(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let pages: DeleteSet = form.parse("pages")?;
    let upload = form.take_file(FILE_FIELD)?;

    let remaining = single_file_pipeline(&state, upload, move |input, output| {
        delete_pdf_pages(input, &pages, output)
    })
    .await?;

    Ok(pdf_response(remaining, "deleted_pages.pdf"))
}

/// Re-encode a PDF, dropping unreferenced objects
pub async fn compress_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let upload = form.take_file(FILE_FIELD)?;

    let compressed = single_file_pipeline(&state, upload, reencode_pdf_file).await?;
    Ok(pdf_response(compressed, "compressed.pdf"))
}

/// Merge PDFs and images into one PDF; anything else is skipped
pub async fn merge_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let uploads = form.take_files(FILES_FIELDS);
    if uploads.is_empty() {
        return Err(AppError::missing_field("files"));
    }

    let merged = run_pipeline(&state, move |workspace| {
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let document = match upload.kind() {
                DocumentKind::Pdf => Document::open(workspace.persist_upload(upload)?)?,
                DocumentKind::Image(format) => {
                    debug!(filename = upload.filename(), ?format, "Converting image part");
                    let path = workspace.persist_upload(upload)?;
                    image_to_pdf(&std::fs::read(path)?)?
                }
                DocumentKind::Unsupported => {
                    info!(filename = upload.filename(), "Skipping unsupported file");
                    continue;
                }
            };
            documents.push(document);
        }

        if documents.is_empty() {
            return Err(PdfToolsError::Input(
                "no PDF or image files were uploaded".to_string(),
            ));
        }

        let output = workspace.allocate(".pdf")?;
        merge_documents(documents)?.save(&output)?;
        Ok(std::fs::read(&output)?)
    })
    .await?;

    Ok(pdf_response(merged, "merged.pdf"))
}

/// Wrap an uploaded image in a one-page PDF
pub async fn image_to_pdf_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = Form::read(multipart).await?;
    let upload = form.take_file(FILE_FIELD)?;

    let converted = single_file_pipeline(&state, upload, image_file_to_pdf).await?;
    Ok(pdf_response(converted, "converted.pdf"))
}

/// Recognise the text in an uploaded image
pub async fn image_to_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrResponse>, AppError> {
    let mut form = Form::read(multipart).await?;
    let upload = form.take_file(FILE_FIELD)?;
    let recognizer = state.recognizer();

    let text = run_pipeline(&state, move |workspace| {
        let input = workspace.persist_upload(&upload)?;
        let data = std::fs::read(&input)?;
        ocr_text(recognizer.as_ref(), &data)
    })
    .await?;

    Ok(Json(OcrResponse { text }))
}

/// Run `job` on a blocking worker inside a fresh workspace.
///
/// The workspace is moved into the worker, so its files are released when
/// the job finishes even if the client has gone away and this future was
/// dropped. A panicking job releases them while unwinding.
async fn run_pipeline<T, F>(state: &AppState, job: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut TempWorkspace) -> pdf_tools::Result<T> + Send + 'static,
{
    let mut workspace = TempWorkspace::new(state.temp_dir());
    let result = tokio::task::spawn_blocking(move || {
        let result = job(&mut workspace);
        workspace.release_all();
        result
    })
    .await?;
    Ok(result?)
}

/// Persist one upload, run `transform(input, output)` and return the output
async fn single_file_pipeline<F>(
    state: &AppState,
    upload: UploadedFile,
    transform: F,
) -> Result<Vec<u8>, AppError>
where
    F: FnOnce(PathBuf, PathBuf) -> pdf_tools::Result<()> + Send + 'static,
{
    run_pipeline(state, move |workspace| {
        let input = workspace.persist_upload(&upload)?;
        let output = workspace.allocate(".pdf")?;
        transform(input, output.clone())?;
        Ok(std::fs::read(&output)?)
    })
    .await
}

/// Shared body of both split endpoints: one PDF per range, in range order
async fn split_parts(state: &AppState, multipart: Multipart) -> Result<Vec<Vec<u8>>, AppError> {
    let mut form = Form::read(multipart).await?;
    let ranges: RangeList = form.parse("ranges")?;
    let upload = form.take_file(FILE_FIELD)?;

    run_pipeline(state, move |workspace| {
        let input = workspace.persist_upload(&upload)?;
        let outputs = (0..ranges.len())
            .map(|_| workspace.allocate(".pdf"))
            .collect::<pdf_tools::Result<Vec<_>>>()?;
        split_pdf(&input, &ranges, &outputs)?;
        outputs
            .iter()
            .map(|path| std::fs::read(path).map_err(PdfToolsError::from))
            .collect()
    })
    .await
}

fn zip_parts(parts: &[Vec<u8>]) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (i, part) in parts.iter().enumerate() {
        zip.start_file(format!("split_part{}.pdf", i + 1), options)?;
        zip.write_all(part).map_err(PdfToolsError::from)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            ("Content-Type", "application/pdf".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
