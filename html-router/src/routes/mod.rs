pub mod gate;
pub mod ingestion;
pub mod query;
pub mod transcript;

use common::session::QaPair;
use serde::Serialize;

use crate::session::SessionContext;

/// Context rendered into the workspace page and its htmx panel.
#[derive(Serialize)]
pub struct WorkspaceData {
    pub documents: Vec<String>,
    pub exchanges: Vec<QaPair>,
    pub can_download: bool,
    pub notice: Option<String>,
}

impl WorkspaceData {
    pub async fn from_context(context: &SessionContext, notice: Option<String>) -> Self {
        let transcript = context.transcript.read().await;
        Self {
            documents: context.documents.read().await.clone(),
            exchanges: transcript.pairs().to_vec(),
            can_download: !transcript.is_empty(),
            notice,
        }
    }
}
