use common::utils::template_engine::{ProvidesTemplateEngine, TemplateEngine};
use common::{create_template_engine, utils::config::AppConfig};
use std::sync::Arc;
use tracing::debug;

use crate::{session::SessionRegistry, SessionStoreType};

#[derive(Clone)]
pub struct HtmlState {
    pub templates: Arc<TemplateEngine>,
    pub session_store: Arc<SessionStoreType>,
    pub config: AppConfig,
    pub sessions: SessionRegistry,
}

impl HtmlState {
    pub fn new_with_resources(
        session_store: Arc<SessionStoreType>,
        config: AppConfig,
        template_engine: Option<Arc<TemplateEngine>>,
    ) -> Self {
        let templates =
            template_engine.unwrap_or_else(|| Arc::new(create_template_engine!("templates")));
        debug!("Template engine configured for html_router.");

        Self {
            templates,
            session_store,
            config,
            sessions: SessionRegistry::new(),
        }
    }
}

impl ProvidesTemplateEngine for HtmlState {
    fn template_engine(&self) -> &Arc<TemplateEngine> {
        &self.templates
    }
}
