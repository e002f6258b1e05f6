use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{document_chunk::DocumentChunk, StoredObject},
    },
    utils::embedding::EmbeddingProvider,
};
use serde_json::Value;

const ANSWER_SYSTEM_PROMPT: &str = "You answer questions about the user's uploaded documents. \
Base your answer strictly on the provided context information. \
If the context does not contain the answer, say so plainly.";

/// Finds the chunks closest to the question across every ingested document.
///
/// The search runs over the whole chunk table; nothing scopes it to a single
/// source document.
pub async fn find_relevant_chunks(
    db: &SurrealDbClient,
    embedding_provider: &EmbeddingProvider,
    question: &str,
    take: u8,
) -> Result<Vec<DocumentChunk>, AppError> {
    let question_embedding = embedding_provider.embed(question).await?;

    let closest_query = format!(
        "SELECT *, vector::distance::knn() AS distance FROM {} WHERE embedding <|{},40|> {:?} ORDER BY distance",
        DocumentChunk::table_name(),
        take,
        question_embedding
    );

    let chunks: Vec<DocumentChunk> = db.query(closest_query).await?.take(0)?;

    Ok(chunks)
}

/// Convert retrieved chunks to JSON format for LLM context
pub fn chunks_to_chat_context(chunks: &[DocumentChunk]) -> Value {
    serde_json::json!(chunks
        .iter()
        .map(|chunk| {
            serde_json::json!({
                "id": chunk.id,
                "source": chunk.source_id,
                "content": chunk.chunk,
            })
        })
        .collect::<Vec<_>>())
}

pub fn create_user_message(context_json: &Value, question: &str) -> String {
    format!(
        r"
        Context Information:
        ==================
        {context_json}

        User Question:
        ==================
        {question}
        "
    )
}

pub fn create_chat_request(
    user_message: String,
    model: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages([
            ChatCompletionRequestSystemMessage::from(ANSWER_SYSTEM_PROMPT).into(),
            ChatCompletionRequestUserMessage::from(user_message).into(),
        ])
        .build()
}

pub fn process_llm_response(
    response: CreateChatCompletionResponse,
) -> Result<String, AppError> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .ok_or(AppError::Processing(
            "No content found in LLM response".into(),
        ))
}

/// One answering round: retrieve, assemble the prompt, one completion call.
pub async fn answer_question(
    db: &SurrealDbClient,
    openai_client: &Client<OpenAIConfig>,
    embedding_provider: &EmbeddingProvider,
    model: &str,
    question: &str,
    take: u8,
) -> Result<String, AppError> {
    let chunks = find_relevant_chunks(db, embedding_provider, question, take).await?;

    tracing::debug!(
        chunk_count = chunks.len(),
        "retrieved context for question"
    );

    let context_json = chunks_to_chat_context(&chunks);
    let user_message = create_user_message(&context_json, question);
    let request = create_chat_request(user_message, model)?;

    let response = openai_client.chat().create(request).await?;

    process_llm_response(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn setup_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory("test_ns", &database)
            .await
            .expect("Failed to start in-memory surrealdb");
        db.query(format!(
            "DEFINE INDEX chunk_embedding_idx ON {} FIELDS embedding HNSW DIMENSION 32",
            DocumentChunk::table_name()
        ))
        .await
        .expect("Failed to define vector index");
        db
    }

    #[tokio::test]
    async fn test_find_relevant_chunks_prefers_matching_text() {
        let db = setup_db().await;
        let provider = EmbeddingProvider::new_hashed(32);

        let about_rust = "rust borrow checker ownership lifetimes".to_string();
        let about_cooking = "sourdough bread hydration baking oven".to_string();

        let rust_embedding = provider.embed(&about_rust).await.unwrap();
        let cooking_embedding = provider.embed(&about_cooking).await.unwrap();

        db.store_item(DocumentChunk::new("doc_a".into(), about_rust.clone(), rust_embedding))
            .await
            .expect("Failed to store chunk");
        db.store_item(DocumentChunk::new("doc_b".into(), about_cooking, cooking_embedding))
            .await
            .expect("Failed to store chunk");

        let results = find_relevant_chunks(&db, &provider, "rust ownership", 1)
            .await
            .expect("Search failed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk, about_rust);
    }

    #[tokio::test]
    async fn test_find_relevant_chunks_spans_all_documents() {
        let db = setup_db().await;
        let provider = EmbeddingProvider::new_hashed(32);

        for (source, text) in [
            ("doc_a", "tokio async runtime tasks"),
            ("doc_b", "tokio task scheduling details"),
            ("doc_c", "gardening tomatoes in spring"),
        ] {
            let embedding = provider.embed(text).await.unwrap();
            db.store_item(DocumentChunk::new(source.into(), text.into(), embedding))
                .await
                .expect("Failed to store chunk");
        }

        let results = find_relevant_chunks(&db, &provider, "tokio tasks", 2)
            .await
            .expect("Search failed");

        let sources: Vec<&str> = results.iter().map(|c| c.source_id.as_str()).collect();
        assert_eq!(results.len(), 2);
        assert!(sources.contains(&"doc_a"));
        assert!(sources.contains(&"doc_b"));
    }

    #[test]
    fn test_create_user_message_contains_context_and_question() {
        let context = serde_json::json!([{"id": "c1", "content": "chunk text"}]);
        let message = create_user_message(&context, "what is this about?");
        assert!(message.contains("chunk text"));
        assert!(message.contains("what is this about?"));
    }

    #[test]
    fn test_chunks_to_chat_context_shape() {
        let chunk = DocumentChunk::new("doc_a".into(), "alpha".into(), vec![0.5]);
        let context = chunks_to_chat_context(&[chunk.clone()]);
        assert_eq!(context[0]["content"], "alpha");
        assert_eq!(context[0]["source"], "doc_a");
        assert_eq!(context[0]["id"], Value::String(chunk.id));
    }
}
