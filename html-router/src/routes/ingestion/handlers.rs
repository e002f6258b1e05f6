use axum::{extract::State, response::IntoResponse};
use axum_htmx::HxRequest;
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    html_state::HtmlState,
    middlewares::{
        response_middleware::{HtmlError, TemplateResponse},
        session_middleware::RequireSession,
    },
    routes::WorkspaceData,
    session::with_engine_timeout,
};
use engine::ContentType;

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

/// Ingests one uploaded PDF into the session's index.
///
/// The upload is staged as a named temp file whose guard removes it on every
/// exit path, so a failed ingest never strands bytes on disk.
pub async fn process_upload(
    State(state): State<HtmlState>,
    RequireSession(context): RequireSession,
    HxRequest(is_htmx): HxRequest,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let file_name = input
        .file
        .metadata
        .file_name
        .clone()
        .unwrap_or_else(|| "document.pdf".to_string());

    if !is_pdf_upload(&file_name, input.file.metadata.content_type.as_deref()) {
        return Ok(TemplateResponse::bad_request("Only PDF files can be uploaded.").into_response());
    }

    let staged = input.file.contents;
    let receipt = with_engine_timeout(
        state.config.engine_timeout_secs,
        context.engine.ingest(staged.path(), ContentType::Pdf),
    )
    .await?;
    // Guard still owns the staged file; dropping it below removes the bytes
    drop(staged);

    info!(
        session_id = %context.id,
        file_name,
        chunk_count = receipt.chunk_count,
        char_count = receipt.char_count,
        "document added to session index"
    );

    context.documents.write().await.push(file_name.clone());

    let data = WorkspaceData::from_context(
        &context,
        Some(format!("Added {file_name} to your documents.")),
    )
    .await;

    if is_htmx {
        Ok(TemplateResponse::new_partial("workspace.html", "panel", data).into_response())
    } else {
        Ok(TemplateResponse::new_template("workspace.html", data).into_response())
    }
}

fn is_pdf_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let has_pdf_extension = file_name.to_ascii_lowercase().ends_with(".pdf");
    let has_pdf_mime = content_type
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map(|value| value == mime::APPLICATION_PDF)
        .unwrap_or(false);
    has_pdf_extension || has_pdf_mime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_upload_accepts_extension() {
        assert!(is_pdf_upload("Report.PDF", None));
        assert!(is_pdf_upload("paper.pdf", Some("application/octet-stream")));
    }

    #[test]
    fn test_is_pdf_upload_accepts_mime() {
        assert!(is_pdf_upload("upload", Some("application/pdf")));
    }

    #[test]
    fn test_is_pdf_upload_rejects_other_files() {
        assert!(!is_pdf_upload("notes.txt", Some("text/plain")));
        assert!(!is_pdf_upload("archive.zip", None));
    }

    #[test]
    fn test_staged_file_is_removed_when_the_guard_drops() {
        let staged = NamedTempFile::new().expect("failed to create temp file");
        let path = staged.path().to_path_buf();
        std::fs::write(&path, b"staged upload bytes").expect("failed to write");
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists(), "staged bytes must not outlive the guard");
    }
}
