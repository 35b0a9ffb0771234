use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

/// OpenAI-compatible embedding endpoint used to vectorize queries
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_base: default_embedding_base(),
            api_key: String::new(),
            model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_base() -> String { "http://localhost:8080/v1".to_string() }
fn default_embedding_model() -> String { "BAAI/bge-small-zh-v1.5".to_string() }
fn default_timeout_secs() -> u64 { 30 }

/// Chroma collection holding the recipe documents
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_chroma_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Entries with a distance above this value are dropped after search.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            url: default_chroma_url(),
            collection: default_collection(),
            score_threshold: default_score_threshold(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_chroma_url() -> String { "http://localhost:8001".to_string() }
fn default_collection() -> String { "recipe_collection_v3".to_string() }
fn default_score_threshold() -> f64 { 1.0 }

/// Generative backend. An empty `api_key` means no backend is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base")]
    pub api_base: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_llm_base(),
            model: default_llm_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmSettings {
    /// The API key, if one is set and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn default_llm_base() -> String { "https://api.siliconflow.cn/v1".to_string() }
fn default_llm_model() -> String { "Qwen/Qwen2.5-7B-Instruct".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_llm_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_single_top_k")]
    pub single_top_k: usize,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    /// Apply user dislikes/allergies on the list path too.
    #[serde(default)]
    pub filter_list_results: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            single_top_k: default_single_top_k(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            filter_list_results: false,
        }
    }
}

fn default_single_top_k() -> usize { 6 }
fn default_limit() -> usize { 5 }
fn default_max_limit() -> usize { 20 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_embedding_cache_size")]
    pub embedding_cache_size: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            embedding_cache_size: default_embedding_cache_size(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_embedding_cache_size() -> u64 { 1000 }
fn default_cache_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with AICHEF__)
    /// 4. Well-known credential variables (LLM_API_KEY, CHROMA_URL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., AICHEF__INDEX__SCORE_THRESHOLD -> index.score_threshold
            .add_source(
                Environment::with_prefix("AICHEF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("AICHEF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Map plain credential variables onto their config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("LLM_API_KEY", "llm.api_key"),
    ("LLM_BASE_URL", "llm.api_base"),
    ("LLM_MODEL_NAME", "llm.model"),
    ("EMBEDDING_API_KEY", "embedding.api_key"),
    ("EMBEDDING_BASE_URL", "embedding.api_base"),
    ("EMBEDDING_MODEL_NAME", "embedding.model"),
    ("CHROMA_URL", "index.url"),
    ("COLLECTION_NAME", "index.collection"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_settings() {
        let index = IndexSettings::default();
        assert_eq!(index.score_threshold, 1.0);
        assert_eq!(index.collection, "recipe_collection_v3");
        assert_eq!(index.timeout_secs, 30);
    }

    #[test]
    fn test_default_search_settings() {
        let search = SearchSettings::default();
        assert_eq!(search.single_top_k, 6);
        assert_eq!(search.default_limit, 5);
        assert!(!search.filter_list_results);
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let mut llm = LlmSettings::default();
        assert!(llm.credential().is_none());

        llm.api_key = Some("   ".to_string());
        assert!(llm.credential().is_none());

        llm.api_key = Some("sk-test".to_string());
        assert_eq!(llm.credential(), Some("sk-test"));
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("aichef-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            "[index]\nscore_threshold = 0.5\ntimeout_secs = 5\n\n[search]\nfilter_list_results = true\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.index.score_threshold, 0.5);
        assert_eq!(settings.index.timeout_secs, 5);
        assert!(settings.search.filter_list_results);
        assert_eq!(settings.server.port, 8000);

        std::fs::remove_dir_all(&dir).ok();
    }
}
