use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use common::{error::AppError, session::Transcript};
use engine::Engine;
use tokio::sync::RwLock;

/// Everything one interactive session owns: its engine, its transcript, and
/// the names of the documents it has ingested.
///
/// The credential lives inside the engine's OpenAI client and nowhere else;
/// dropping the context drops it.
pub struct SessionContext {
    pub id: String,
    pub engine: Arc<Engine>,
    pub transcript: RwLock<Transcript>,
    pub documents: RwLock<Vec<String>>,
}

impl SessionContext {
    pub fn new(id: String, engine: Engine) -> Self {
        Self {
            id,
            engine: Arc::new(engine),
            transcript: RwLock::new(Transcript::new()),
            documents: RwLock::new(Vec::new()),
        }
    }
}

/// Process-local map from session id to session context.
///
/// Entries live until process end; nothing is persisted across restarts.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<SessionContext>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, context: Arc<SessionContext>) {
        let mut sessions = self.inner.write().await;
        sessions.insert(context.id.clone(), context);
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionContext>> {
        let sessions = self.inner.read().await;
        sessions.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Bounds an engine call; expiry surfaces as a timeout error instead of the
/// request hanging indefinitely.
pub async fn with_engine_timeout<F, T>(timeout_secs: u64, future: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(Duration::from_secs(timeout_secs), future)
        .await
        .map_err(|_| AppError::Timeout(timeout_secs))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{
        ChunkingConfig, EmbedderConfig, EmbedderProvider, EngineConfig, LlmConfig, LlmProvider,
        VectorDbConfig, VectorDbProvider,
    };

    async fn memory_engine() -> Engine {
        Engine::create(EngineConfig {
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: "sk-test".to_string(),
                model: "gpt-4o-mini".to_string(),
                base_url: "http://localhost:0/v1".to_string(),
            },
            vectordb: VectorDbConfig {
                provider: VectorDbProvider::Memory,
            },
            embedder: EmbedderConfig {
                provider: EmbedderProvider::Hashed { dimensions: 32 },
            },
            chunking: ChunkingConfig {
                min_chars: 50,
                max_chars: 200,
            },
            retrieval_top_k: 4,
        })
        .await
        .expect("failed to create engine")
    }

    #[tokio::test]
    async fn test_registry_round_trip() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);

        let context = Arc::new(SessionContext::new("sid-1".to_string(), memory_engine().await));
        registry.insert(context).await;

        assert_eq!(registry.len().await, 1);
        let found = registry.get("sid-1").await.expect("session missing");
        assert_eq!(found.id, "sid-1");
        assert!(registry.get("sid-2").await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let first = Arc::new(SessionContext::new("a".to_string(), memory_engine().await));
        let second = Arc::new(SessionContext::new("b".to_string(), memory_engine().await));
        registry.insert(first).await;
        registry.insert(second).await;

        let a = registry.get("a").await.expect("session a missing");
        a.transcript
            .write()
            .await
            .append("q".to_string(), "a".to_string());

        let b = registry.get("b").await.expect("session b missing");
        assert!(b.transcript.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_timeout_expires() {
        let result: Result<(), AppError> = with_engine_timeout(0, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Timeout(0))));
    }

    #[tokio::test]
    async fn test_engine_timeout_passes_result_through() {
        let result = with_engine_timeout(60, async { Ok::<_, AppError>(42) }).await;
        assert_eq!(result.expect("should complete"), 42);
    }
}
