use common::utils::config::AppConfig;

/// Full configuration surface of one engine instance.
///
/// Built once per session; the credential entered at the gate is bound to
/// both the language-model and the embedder backend.
#[derive(Clone)]
pub struct EngineConfig {
    pub llm: LlmConfig,
    pub vectordb: VectorDbConfig,
    pub embedder: EmbedderConfig,
    pub chunking: ChunkingConfig,
    pub retrieval_top_k: u8,
}

#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
}

#[derive(Clone)]
pub struct VectorDbConfig {
    pub provider: VectorDbProvider,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VectorDbProvider {
    /// On-disk store rooted at the given directory.
    SurrealKv { storage_dir: String },
    /// In-memory store, used by tests.
    Memory,
}

#[derive(Clone)]
pub struct EmbedderConfig {
    pub provider: EmbedderProvider,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmbedderProvider {
    /// Bound to the same credential as the language model.
    OpenAi { model: String, dimensions: u32 },
    /// Deterministic local vectors, used by tests.
    Hashed { dimensions: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct ChunkingConfig {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl EngineConfig {
    /// Wire a session credential and a session-owned storage directory into
    /// the server-level settings.
    pub fn for_session(config: &AppConfig, api_key: String, storage_dir: String) -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key,
                model: config.query_model.clone(),
                base_url: config.openai_base_url.clone(),
            },
            vectordb: VectorDbConfig {
                provider: VectorDbProvider::SurrealKv { storage_dir },
            },
            embedder: EmbedderConfig {
                provider: EmbedderProvider::OpenAi {
                    model: config.embedding_model.clone(),
                    dimensions: config.embedding_dimensions,
                },
            },
            chunking: ChunkingConfig {
                min_chars: config.chunk_min_chars,
                max_chars: config.chunk_max_chars,
            },
            retrieval_top_k: config.retrieval_top_k,
        }
    }

    pub fn embedding_dimension(&self) -> usize {
        match &self.embedder.provider {
            EmbedderProvider::OpenAi { dimensions, .. } => *dimensions as usize,
            EmbedderProvider::Hashed { dimensions } => *dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_session_binds_credential_to_llm() {
        let app_config = AppConfig::default();
        let config = EngineConfig::for_session(
            &app_config,
            "sk-test".to_string(),
            "/tmp/store".to_string(),
        );

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(
            config.vectordb.provider,
            VectorDbProvider::SurrealKv {
                storage_dir: "/tmp/store".to_string()
            }
        );
        assert!(matches!(
            config.embedder.provider,
            EmbedderProvider::OpenAi { .. }
        ));
    }

    #[test]
    fn test_embedding_dimension_follows_provider() {
        let mut config = EngineConfig::for_session(
            &AppConfig::default(),
            "sk-test".to_string(),
            "/tmp/store".to_string(),
        );
        assert_eq!(config.embedding_dimension(), 1536);

        config.embedder.provider = EmbedderProvider::Hashed { dimensions: 64 };
        assert_eq!(config.embedding_dimension(), 64);
    }
}
