pub mod html_state;
pub mod middlewares;
pub mod router_factory;
pub mod routes;
pub mod session;

use axum::{extract::FromRef, Router};
use axum_session::{Session, SessionNullPool, SessionStore};
use html_state::HtmlState;
use router_factory::RouterFactory;

pub type SessionType = Session<SessionNullPool>;
pub type SessionStoreType = SessionStore<SessionNullPool>;

/// Html routes
pub fn html_routes<S>(app_state: &HtmlState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    RouterFactory::new(app_state)
        .add_public_routes(routes::gate::router())
        .add_protected_routes(routes::ingestion::router(app_state.config.upload_limit_bytes))
        .add_protected_routes(routes::query::router())
        .add_protected_routes(routes::transcript::router())
        .with_compression()
        .build()
}
