pub mod handlers;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use handlers::{create_session, show_index};

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new()
        .route("/", get(show_index))
        .route("/session", post(create_session))
}
