use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_query_model")]
    pub query_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_chunk_min_chars")]
    pub chunk_min_chars: usize,
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: u8,
    #[serde(default = "default_engine_timeout_secs")]
    pub engine_timeout_secs: u64,
    #[serde(default = "default_upload_limit_bytes")]
    pub upload_limit_bytes: usize,
}

fn default_http_port() -> u16 {
    3000
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_query_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_chunk_min_chars() -> usize {
    500
}

fn default_chunk_max_chars() -> usize {
    2000
}

fn default_retrieval_top_k() -> u8 {
    8
}

fn default_engine_timeout_secs() -> u64 {
    120
}

fn default_upload_limit_bytes() -> usize {
    50_000_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            openai_base_url: default_base_url(),
            query_model: default_query_model(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            chunk_min_chars: default_chunk_min_chars(),
            chunk_max_chars: default_chunk_max_chars(),
            retrieval_top_k: default_retrieval_top_k(),
            engine_timeout_secs: default_engine_timeout_secs(),
            upload_limit_bytes: default_upload_limit_bytes(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = AppConfig::default();
        assert!(config.chunk_min_chars < config.chunk_max_chars);
        assert!(config.retrieval_top_k > 0);
        assert!(config.engine_timeout_secs > 0);
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    }
}
