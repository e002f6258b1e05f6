use axum::Router;
use axum_session::{SessionConfig, SessionNullPool, SessionStore};
use common::utils::config::get_config;
use html_router::{html_routes, html_state::HtmlState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Session vector stores land under data_dir; make sure it exists up front
    tokio::fs::create_dir_all(&config.data_dir).await?;

    // Sessions are process-local and ephemeral, so the null pool is enough
    let session_store = Arc::new(
        SessionStore::<SessionNullPool>::new(None, SessionConfig::default()).await?,
    );

    let html_state = HtmlState::new_with_resources(session_store, config.clone(), None);

    let app = Router::new()
        .merge(html_routes(&html_state))
        .with_state(html_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::utils::config::AppConfig;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn smoke_startup_serves_the_gate() {
        let data_dir = std::env::temp_dir().join(format!("fraga_smoke_{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&data_dir)
            .await
            .expect("failed to create temp data directory");

        let config = AppConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
            http_port: 0,
            ..Default::default()
        };

        let session_store = Arc::new(
            SessionStore::<SessionNullPool>::new(None, SessionConfig::default())
                .await
                .expect("failed to build session store"),
        );

        let html_state = HtmlState::new_with_resources(session_store, config, None);

        let app = Router::new()
            .merge(html_routes(&html_state))
            .with_state(html_state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        tokio::fs::remove_dir_all(&data_dir).await.ok();
    }
}
