use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Form};
use engine::{Engine, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    html_state::HtmlState,
    middlewares::{
        response_middleware::{HtmlError, TemplateResponse},
        session_middleware::SESSION_ID_KEY,
    },
    routes::WorkspaceData,
    session::SessionContext,
    SessionType,
};
use common::error::AppError;

#[derive(Serialize)]
struct GateData {
    error: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct GateParams {
    pub api_key: String,
}

/// The single page: the workspace when a session is established, the
/// credential gate otherwise.
pub async fn show_index(
    State(state): State<HtmlState>,
    session: SessionType,
) -> Result<impl IntoResponse, HtmlError> {
    let context = match session.get::<String>(SESSION_ID_KEY) {
        Some(session_id) => state.sessions.get(&session_id).await,
        None => None,
    };

    match context {
        Some(context) => Ok(TemplateResponse::new_template(
            "workspace.html",
            WorkspaceData::from_context(&context, None).await,
        )),
        None => Ok(TemplateResponse::new_template(
            "gate.html",
            GateData { error: None },
        )),
    }
}

/// Takes the API key and builds the session's engine. The key is validated
/// only for presence here; a bad key surfaces later as an engine failure.
pub async fn create_session(
    State(state): State<HtmlState>,
    session: SessionType,
    Form(form): Form<GateParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let api_key = form.api_key.trim();
    if api_key.is_empty() {
        return Ok(TemplateResponse::new_template(
            "gate.html",
            GateData {
                error: Some("Enter your OpenAI API key to continue.".to_string()),
            },
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let storage_dir = format!(
        "{}/sessions/{}",
        state.config.data_dir.trim_end_matches('/'),
        session_id
    );
    tokio::fs::create_dir_all(&storage_dir)
        .await
        .map_err(AppError::from)?;

    let engine_config =
        EngineConfig::for_session(&state.config, api_key.to_string(), storage_dir);
    let engine = Engine::create(engine_config).await?;

    let context = Arc::new(SessionContext::new(session_id.clone(), engine));
    state.sessions.insert(context.clone()).await;
    session.set(SESSION_ID_KEY, session_id.clone());

    info!(session_id = %session_id, "session established");

    Ok(TemplateResponse::new_template(
        "workspace.html",
        WorkspaceData::from_context(&context, None).await,
    ))
}
