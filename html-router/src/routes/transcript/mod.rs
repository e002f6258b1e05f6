pub mod handlers;

use axum::{extract::FromRef, routing::get, Router};
use handlers::download_transcript;

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route("/transcript", get(download_transcript))
}
