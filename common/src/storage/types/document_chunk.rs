#![allow(clippy::module_name_repetitions)]
use uuid::Uuid;

use crate::stored_object;

stored_object!(DocumentChunk, "document_chunk", {
    source_id: String,
    chunk: String,
    embedding: Vec<f32>
});

impl DocumentChunk {
    pub fn new(source_id: String, chunk: String, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            source_id,
            chunk,
            embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::SurrealDbClient;

    #[tokio::test]
    async fn test_document_chunk_creation() {
        let source_id = "source123".to_string();
        let chunk = "This is a text chunk for testing embeddings".to_string();
        let embedding = vec![0.1, 0.2, 0.3, 0.4, 0.5];

        let document_chunk = DocumentChunk::new(source_id.clone(), chunk.clone(), embedding.clone());

        assert_eq!(document_chunk.source_id, source_id);
        assert_eq!(document_chunk.chunk, chunk);
        assert_eq!(document_chunk.embedding, embedding);
        assert!(!document_chunk.id.is_empty());
    }

    #[tokio::test]
    async fn test_chunks_accumulate_across_sources() {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb");

        let first = DocumentChunk::new("doc_a".into(), "alpha".into(), vec![0.1, 0.2]);
        let second = DocumentChunk::new("doc_b".into(), "beta".into(), vec![0.3, 0.4]);

        db.store_item(first).await.expect("Failed to store chunk");
        db.store_item(second).await.expect("Failed to store chunk");

        let all: Vec<DocumentChunk> = db
            .get_all_stored_items()
            .await
            .expect("Failed to fetch chunks");
        assert_eq!(all.len(), 2, "chunks from both documents share one index");
    }
}
