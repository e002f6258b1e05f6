use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use common::error::AppError;

use crate::middlewares::{
    response_middleware::{HtmlError, TemplateResponse},
    session_middleware::RequireSession,
};

const TRANSCRIPT_FILE_NAME: &str = "pdf-qa-transcript.txt";

/// Streams the transcript as a plain-text download.
///
/// With nothing answered yet there is nothing to export; direct navigation
/// lands back on the workspace.
pub async fn download_transcript(
    RequireSession(context): RequireSession,
) -> Result<Response, HtmlError> {
    let transcript = context.transcript.read().await;

    if transcript.is_empty() {
        return Ok(TemplateResponse::redirect("/").into_response());
    }

    let pair_count = transcript.len();
    let body = transcript.render();
    drop(transcript);

    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    let disposition = format!("attachment; filename=\"{TRANSCRIPT_FILE_NAME}\"");
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|err| AppError::InternalError(err.to_string()))?,
    );

    tracing::debug!(
        session_id = %context.id,
        pair_count,
        file_name = TRANSCRIPT_FILE_NAME,
        "transcript exported"
    );

    Ok(response)
}
