use std::{path::Path, sync::Arc};

use async_openai::{config::OpenAIConfig, Client};
use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{
            document_chunk::DocumentChunk, source_document::SourceDocument, StoredObject,
        },
    },
    utils::embedding::EmbeddingProvider,
};
use tracing::{info, warn};

pub mod answer;
pub mod chunking;
pub mod config;
pub mod extract;

pub use config::{
    ChunkingConfig, EmbedderConfig, EmbedderProvider, EngineConfig, LlmConfig, LlmProvider,
    VectorDbConfig, VectorDbProvider,
};

/// Kind of document handed to `ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Pdf => "application/pdf",
        }
    }
}

/// Summary of one completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub document_id: String,
    pub chunk_count: usize,
    pub char_count: usize,
}

/// The retrieval-and-answering engine behind the web UI.
///
/// One instance exists per interactive session. It owns the session's vector
/// store and holds the credential-bound OpenAI client; every ingested
/// document lands in the same index, so answers draw on all of them.
pub struct Engine {
    db: SurrealDbClient,
    openai_client: Arc<Client<OpenAIConfig>>,
    embedding_provider: EmbeddingProvider,
    query_model: String,
    chunking: ChunkingConfig,
    retrieval_top_k: u8,
}

impl Engine {
    /// Build an engine from its full configuration.
    ///
    /// Opens the vector store, defines the chunk index, and binds the OpenAI
    /// client to the configured credential. Only local I/O happens here; the
    /// first network contact is the first `ingest` or `answer` call. Any
    /// failure propagates and no instance is returned.
    pub async fn create(config: EngineConfig) -> Result<Self, AppError> {
        let db = match &config.vectordb.provider {
            VectorDbProvider::SurrealKv { storage_dir } => {
                SurrealDbClient::new_local(storage_dir).await?
            }
            #[cfg(any(test, feature = "test-utils"))]
            VectorDbProvider::Memory => {
                SurrealDbClient::memory("fraga", &uuid::Uuid::new_v4().to_string()).await?
            }
            #[cfg(not(any(test, feature = "test-utils")))]
            VectorDbProvider::Memory => {
                return Err(AppError::Validation(
                    "in-memory vector store is only available in test builds".into(),
                ))
            }
        };

        define_chunk_index(&db, config.embedding_dimension()).await?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm.api_key.clone())
            .with_api_base(config.llm.base_url.clone());
        let openai_client = Arc::new(Client::with_config(openai_config));

        let embedding_provider = match &config.embedder.provider {
            EmbedderProvider::OpenAi { model, dimensions } => EmbeddingProvider::new_openai(
                openai_client.clone(),
                model.clone(),
                *dimensions,
            ),
            EmbedderProvider::Hashed { dimensions } => {
                EmbeddingProvider::new_hashed(*dimensions)
            }
        };

        info!(
            embedder = embedding_provider.backend_label(),
            model = %config.llm.model,
            "engine created"
        );

        Ok(Self {
            db,
            openai_client,
            embedding_provider,
            query_model: config.llm.model,
            chunking: config.chunking,
            retrieval_top_k: config.retrieval_top_k,
        })
    }

    /// Ingest one document into the session index.
    ///
    /// Extracts the text, chunks it, embeds every chunk, and persists the
    /// source record plus its chunks. Repeat calls add to the same index.
    pub async fn ingest(
        &self,
        file_path: &Path,
        content_type: ContentType,
    ) -> Result<IngestReceipt, AppError> {
        let text = match content_type {
            ContentType::Pdf => extract::extract_pdf_text(file_path).await?,
        };

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        self.index_extracted_text(&file_name, content_type.mime(), &text)
            .await
    }

    /// Answer a question against everything ingested so far.
    pub async fn answer(&self, question: &str) -> Result<String, AppError> {
        answer::answer_question(
            &self.db,
            &self.openai_client,
            &self.embedding_provider,
            &self.query_model,
            question,
            self.retrieval_top_k,
        )
        .await
    }

    async fn index_extracted_text(
        &self,
        file_name: &str,
        content_type: &str,
        text: &str,
    ) -> Result<IngestReceipt, AppError> {
        let char_count = text.chars().count();

        let chunks =
            chunking::prepare_chunks(text, self.chunking.min_chars, self.chunking.max_chars)?;
        let embeddings = self.embedding_provider.embed_batch(chunks.clone()).await?;

        let document = SourceDocument::new(
            file_name.to_string(),
            content_type.to_string(),
            char_count,
        );
        let document_id = document.id.clone();
        self.db.store_item(document).await?;

        let chunk_count = chunks.len();
        for (chunk_text, embedding) in chunks.into_iter().zip(embeddings) {
            let stored = self
                .db
                .store_item(DocumentChunk::new(
                    document_id.clone(),
                    chunk_text,
                    embedding,
                ))
                .await;
            if let Err(err) = stored {
                // A half-persisted document would silently feed retrieval;
                // remove the source row and any chunks stored so far
                self.remove_document(&document_id).await;
                return Err(err.into());
            }
        }

        info!(file_name, chunk_count, char_count, "document ingested");

        Ok(IngestReceipt {
            document_id,
            chunk_count,
            char_count,
        })
    }

    /// Removes a source row and every chunk persisted for it.
    ///
    /// Best effort: the caller is already on an error path, so a cleanup
    /// failure is logged and swallowed.
    async fn remove_document(&self, document_id: &str) {
        let chunk_cleanup = self
            .db
            .query(format!(
                "DELETE {} WHERE source_id = $source",
                DocumentChunk::table_name()
            ))
            .bind(("source", document_id.to_string()))
            .await
            .and_then(surrealdb::Response::check);

        let document_cleanup: Result<Option<SourceDocument>, _> = self
            .db
            .delete((SourceDocument::table_name(), document_id))
            .await;

        if chunk_cleanup.is_err() || document_cleanup.is_err() {
            warn!(document_id, "failed to clean up after aborted ingest");
        }
    }
}

async fn define_chunk_index(db: &SurrealDbClient, dimension: usize) -> Result<(), AppError> {
    db.query(format!(
        "DEFINE INDEX IF NOT EXISTS chunk_embedding_idx ON {} FIELDS embedding HNSW DIMENSION {}",
        DocumentChunk::table_name(),
        dimension
    ))
    .await?
    .check()?;

    Ok(())
}
