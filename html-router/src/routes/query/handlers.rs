use axum::{extract::State, response::IntoResponse, Form};
use axum_htmx::HxRequest;
use serde::{Deserialize, Serialize};
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

#[derive(Deserialize, Serialize)]
pub struct QuestionParams {
    pub question: String,
}

/// Runs one answering round and appends the exchange to the transcript.
///
/// Every submission is a fresh engine call; nothing deduplicates repeated
/// questions. An empty submission re-renders without touching the engine.
pub async fn ask_question(
    State(state): State<HtmlState>,
    RequireSession(context): RequireSession,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<QuestionParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let question = form.question.trim();

    if question.is_empty() {
        let data = WorkspaceData::from_context(&context, None).await;
        return Ok(render_workspace(is_htmx, data));
    }

    let answer = with_engine_timeout(
        state.config.engine_timeout_secs,
        context.engine.answer(question),
    )
    .await?;

    context
        .transcript
        .write()
        .await
        .append(question.to_string(), answer);

    info!(
        session_id = %context.id,
        question_chars = question.len(),
        "question answered"
    );

    let data = WorkspaceData::from_context(&context, None).await;
    Ok(render_workspace(is_htmx, data))
}

fn render_workspace(is_htmx: bool, data: WorkspaceData) -> axum::response::Response {
    if is_htmx {
        TemplateResponse::new_partial("workspace.html", "panel", data).into_response()
    } else {
        TemplateResponse::new_template("workspace.html", data).into_response()
    }
}
