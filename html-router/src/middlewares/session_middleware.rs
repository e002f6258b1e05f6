use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{html_state::HtmlState, session::SessionContext, SessionType};

use super::response_middleware::TemplateResponse;

/// Session key holding the registry id minted at the credential gate.
pub const SESSION_ID_KEY: &str = "qa_session_id";

#[derive(Clone)]
pub struct RequireSession(pub Arc<SessionContext>);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<SessionContext>>()
            .cloned()
            .map(RequireSession)
            .ok_or_else(|| TemplateResponse::redirect("/").into_response())
    }
}

/// Resolves the session context and adds it to request extensions, sending
/// visitors without an established session back to the credential gate.
pub async fn require_session(
    State(state): State<HtmlState>,
    session: SessionType,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match session.get::<String>(SESSION_ID_KEY) {
        Some(session_id) => state.sessions.get(&session_id).await,
        None => None,
    };

    match context {
        Some(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        None => TemplateResponse::redirect("/").into_response(),
    }
}
