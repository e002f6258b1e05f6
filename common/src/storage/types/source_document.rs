#![allow(clippy::module_name_repetitions)]
use uuid::Uuid;

use crate::stored_object;

stored_object!(SourceDocument, "source_document", {
    file_name: String,
    content_type: String,
    char_count: usize
});

impl SourceDocument {
    pub fn new(file_name: String, content_type: String, char_count: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            file_name,
            content_type,
            char_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::SurrealDbClient;

    #[tokio::test]
    async fn test_source_document_creation() {
        let document = SourceDocument::new(
            "report.pdf".to_string(),
            "application/pdf".to_string(),
            4321,
        );

        assert_eq!(document.file_name, "report.pdf");
        assert_eq!(document.content_type, "application/pdf");
        assert_eq!(document.char_count, 4321);
        assert!(!document.id.is_empty());
    }

    #[tokio::test]
    async fn test_source_document_persistence() {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb");

        let document = SourceDocument::new(
            "manual.pdf".to_string(),
            "application/pdf".to_string(),
            99,
        );
        let document_id = document.id.clone();

        db.store_item(document.clone())
            .await
            .expect("Failed to store document");

        let retrieved: Option<SourceDocument> = db
            .get_item(&document_id)
            .await
            .expect("Failed to retrieve document");

        assert_eq!(retrieved, Some(document));
    }
}
