pub mod handlers;

use axum::{extract::FromRef, routing::post, Router};
use handlers::ask_question;

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route("/questions", post(ask_question))
}
