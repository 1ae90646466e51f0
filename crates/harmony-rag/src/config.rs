//! Configuration for the assistant backend
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file. Everything has a default; malformed CORS and rate limit
//! values fall back with a warning, malformed numbers are fatal.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::rate_limit::{RateLimit, RatePeriod};
use crate::security::mask_secret;

/// Origin allowed when `CORS_ORIGINS` is absent or unusable
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default header carrying the client API key
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// A configuration value that must never be logged in clear
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for comparisons and outbound auth headers only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", mask_secret(&self.0))
    }
}

/// Main backend configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,
    /// Disables API key enforcement. True only when `environment` is `development`.
    pub development_mode: bool,
    /// Key clients must present on protected routes
    pub api_key: Secret,
    /// Header carrying the client key
    pub api_key_header: String,
    /// Allowed CORS origins, never empty
    pub cors_origins: Vec<String>,
    /// Maximum declared request body size in bytes
    pub max_request_size: u64,
    /// Maximum question length in characters
    pub max_question_length: usize,
    /// Per-route quotas
    pub rate_limits: RateLimitConfig,
    /// Listener configuration
    pub server: ServerConfig,
    /// Embedding / chat model configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Indexer chunking configuration
    pub chunking: ChunkingConfig,
    /// Log output configuration
    pub logging: LoggingConfig,
    /// Fallbacks taken while loading, replayed by [`Settings::log_loaded`]
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            development_mode: false,
            api_key: Secret::default(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_request_size: 1024 * 1024, // 1MB
            max_question_length: 500,
            rate_limits: RateLimitConfig::default(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            vector_db: VectorDbConfig::default(),
            chunking: ChunkingConfig::default(),
            logging: LoggingConfig::default(),
            warnings: Vec::new(),
        }
    }
}

/// Per-route request quotas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub generate: RateLimit,
    pub chat: RateLimit,
    pub health: RateLimit,
}

impl RateLimitConfig {
    pub const DEFAULT_GENERATE: RateLimit = RateLimit::new(3, RatePeriod::Minute);
    pub const DEFAULT_CHAT: RateLimit = RateLimit::new(3, RatePeriod::Minute);
    pub const DEFAULT_HEALTH: RateLimit = RateLimit::new(30, RatePeriod::Minute);
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            generate: Self::DEFAULT_GENERATE,
            chat: Self::DEFAULT_CHAT,
            health: Self::DEFAULT_HEALTH,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// OpenAI-compatible model service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Provider API key
    pub api_key: Secret,
    /// Chat completion model
    pub chat_model: String,
    /// Embedding model
    pub embedding_model: String,
    /// Sampling temperature for answers
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: Secret::default(),
            chat_model: "gpt-3.5-turbo-0125".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone)]
pub struct VectorDbConfig {
    /// JSON file holding the indexed chunks
    pub storage_path: PathBuf,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    /// PDF indexed by the indexer binary
    pub pdf_path: PathBuf,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("data/vector_store.json"),
            top_k: 5,
            pdf_path: PathBuf::from("data/harmony.pdf"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Console level when `RUST_LOG` is unset
    pub level: String,
    /// Log file, appended to
    pub file: PathBuf,
    /// Log file level
    pub file_level: String,
    /// Size in bytes at which the log file rolls over, 0 to disable
    pub max_file_size: u64,
    /// Rolled-over files kept next to the log file
    pub max_backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("logs/app.log"),
            file_level: "debug".to_string(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_backups: 5,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and build settings from the environment.
    pub fn from_env() -> Result<Self> {
        let dotenv = dotenvy::dotenv();

        let mut settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Err(e) = dotenv {
            if !e.not_found() {
                settings
                    .warnings
                    .insert(0, format!("Ignoring unreadable .env file: {}", e));
            }
        }
        Ok(settings)
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        let environment = get("ENVIRONMENT").unwrap_or(defaults.environment);
        let development_mode = environment.trim().eq_ignore_ascii_case("development");

        let mut warnings = Vec::new();

        let cors_origins = parse_cors_origins(
            get("CORS_ORIGINS").as_deref().unwrap_or(""),
            &mut warnings,
        );

        let rate_limit = |key: &str, default: RateLimit, warnings: &mut Vec<String>| match get(key) {
            Some(value) => RateLimit::parse_or(&value, default, key, warnings),
            None => default,
        };

        let rate_limits = RateLimitConfig {
            generate: rate_limit(
                "RATE_LIMIT_GENERATE",
                RateLimitConfig::DEFAULT_GENERATE,
                &mut warnings,
            ),
            chat: rate_limit("RATE_LIMIT_CHAT", RateLimitConfig::DEFAULT_CHAT, &mut warnings),
            health: rate_limit(
                "RATE_LIMIT_HEALTH",
                RateLimitConfig::DEFAULT_HEALTH,
                &mut warnings,
            ),
        };

        let settings = Settings {
            environment,
            development_mode,
            api_key: Secret::new(get("API_KEY").unwrap_or_default()),
            api_key_header: get("API_KEY_HEADER")
                .map(|h| h.trim().to_string())
                .unwrap_or(defaults.api_key_header),
            cors_origins,
            max_request_size: parse_number(&get, "MAX_REQUEST_SIZE", defaults.max_request_size)?,
            max_question_length: parse_number(
                &get,
                "MAX_QUESTION_LENGTH",
                defaults.max_question_length,
            )?,
            rate_limits,
            server: ServerConfig {
                host: get("HOST").unwrap_or(defaults.server.host),
                port: parse_number(&get, "PORT", defaults.server.port)?,
            },
            llm: LlmConfig {
                base_url: get("OPENAI_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.llm.base_url),
                api_key: Secret::new(get("OPENAI_API_KEY").unwrap_or_default()),
                chat_model: get("CHAT_MODEL").unwrap_or(defaults.llm.chat_model),
                embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.llm.embedding_model),
                temperature: defaults.llm.temperature,
                timeout_secs: parse_number(&get, "LLM_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
            },
            vector_db: VectorDbConfig {
                storage_path: get("VECTOR_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.vector_db.storage_path),
                top_k: parse_number(&get, "RETRIEVAL_TOP_K", defaults.vector_db.top_k)?,
                pdf_path: get("PDF_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.vector_db.pdf_path),
            },
            chunking: ChunkingConfig {
                chunk_size: parse_number(&get, "CHUNK_SIZE", defaults.chunking.chunk_size)?,
                chunk_overlap: parse_number(&get, "CHUNK_OVERLAP", defaults.chunking.chunk_overlap)?,
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL")
                    .map(|l| l.trim().to_ascii_lowercase())
                    .unwrap_or(defaults.logging.level),
                file: get("LOG_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.logging.file),
                file_level: get("LOG_FILE_LEVEL")
                    .map(|l| l.trim().to_ascii_lowercase())
                    .unwrap_or(defaults.logging.file_level),
                max_file_size: parse_number(
                    &get,
                    "LOG_MAX_BYTES",
                    defaults.logging.max_file_size,
                )?,
                max_backups: parse_number(&get, "LOG_BACKUPS", defaults.logging.max_backups)?,
            },
            warnings,
        };

        if settings.max_question_length == 0 {
            return Err(Error::Config(
                "MAX_QUESTION_LENGTH must be at least 1".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Replay load-time warnings, then log every loaded value at debug
    /// level with secrets masked. Call once logging is initialized.
    pub fn log_loaded(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }

        tracing::debug!("Settings ENVIRONMENT: {}", self.environment);
        tracing::debug!("Settings DEVELOPMENT_MODE: {}", self.development_mode);
        tracing::debug!("Settings API_KEY: {}", mask_secret(self.api_key.expose()));
        tracing::debug!("Settings API_KEY_HEADER: {}", self.api_key_header);
        tracing::debug!("Settings CORS_ORIGINS: {:?}", self.cors_origins);
        tracing::debug!("Settings MAX_REQUEST_SIZE: {}", self.max_request_size);
        tracing::debug!("Settings MAX_QUESTION_LENGTH: {}", self.max_question_length);
        tracing::debug!("Settings RATE_LIMIT_GENERATE: {}", self.rate_limits.generate);
        tracing::debug!("Settings RATE_LIMIT_CHAT: {}", self.rate_limits.chat);
        tracing::debug!("Settings RATE_LIMIT_HEALTH: {}", self.rate_limits.health);
        tracing::debug!("Settings HOST/PORT: {}:{}", self.server.host, self.server.port);
        tracing::debug!("Settings OPENAI_BASE_URL: {}", self.llm.base_url);
        tracing::debug!("Settings OPENAI_API_KEY: {}", mask_secret(self.llm.api_key.expose()));
        tracing::debug!("Settings CHAT_MODEL: {}", self.llm.chat_model);
        tracing::debug!("Settings EMBEDDING_MODEL: {}", self.llm.embedding_model);
        tracing::debug!("Settings VECTOR_STORE_PATH: {}", self.vector_db.storage_path.display());
        tracing::debug!("Settings RETRIEVAL_TOP_K: {}", self.vector_db.top_k);
        tracing::debug!("Settings LOG_LEVEL: {}", self.logging.level);
        tracing::debug!("Settings LOG_FILE: {}", self.logging.file.display());
        tracing::debug!("Settings LOG_FILE_LEVEL: {}", self.logging.file_level);
        tracing::debug!(
            "Settings LOG_MAX_BYTES/LOG_BACKUPS: {}/{}",
            self.logging.max_file_size,
            self.logging.max_backups
        );
    }

    /// Listener address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_number<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} must be a number, got {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

/// Parse `CORS_ORIGINS` as a JSON array or a comma-separated list.
///
/// Never returns an empty list; unusable input yields
/// [`DEFAULT_CORS_ORIGIN`] and a message in `warnings`.
pub fn parse_cors_origins(raw: &str, warnings: &mut Vec<String>) -> Vec<String> {
    let value = raw.trim().trim_matches(|c| c == '"' || c == '\'');

    if value.is_empty() {
        return vec![DEFAULT_CORS_ORIGIN.to_string()];
    }

    if value.starts_with('[') && value.ends_with(']') {
        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(serde_json::Value::Array(items)) => {
                let origins: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Null => None,
                        serde_json::Value::String(s) => Some(s.trim().to_string()),
                        other => Some(other.to_string()),
                    })
                    .filter(|origin| !origin.is_empty())
                    .collect();

                if origins.is_empty() {
                    warnings.push("CORS_ORIGINS JSON list is empty, using default".to_string());
                    return vec![DEFAULT_CORS_ORIGIN.to_string()];
                }
                return origins;
            }
            Ok(_) => warnings.push(
                "CORS_ORIGINS JSON is not a list, falling back to comma-separated parsing"
                    .to_string(),
            ),
            Err(e) => warnings.push(format!(
                "Failed to parse CORS_ORIGINS as JSON ({}), falling back to comma-separated parsing",
                e
            )),
        }
    }

    let origins: Vec<String> = value
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        warnings.push("No valid origins found in CORS_ORIGINS, using default".to_string());
        return vec![DEFAULT_CORS_ORIGIN.to_string()];
    }

    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    fn cors(raw: &str) -> Vec<String> {
        parse_cors_origins(raw, &mut Vec::new())
    }

    #[test]
    fn test_cors_json_array() {
        assert_eq!(
            cors(r#"["http://a.test", " http://b.test "]"#),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_cors_quoted_json_array() {
        assert_eq!(cors(r#"'["http://a.test"]'"#), vec!["http://a.test"]);
    }

    #[test]
    fn test_cors_comma_list() {
        let mut warnings = Vec::new();
        assert_eq!(
            parse_cors_origins("http://a.test, http://b.test,,", &mut warnings),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cors_fallbacks() {
        for raw in ["", "   ", "\"\"", "[]", ",,,", "[null, \"\"]"] {
            assert_eq!(cors(raw), vec![DEFAULT_CORS_ORIGIN], "input {:?}", raw);
        }
    }

    #[test]
    fn test_cors_fallback_is_recorded() {
        let mut warnings = Vec::new();
        parse_cors_origins("[]", &mut warnings);
        assert_eq!(warnings, vec!["CORS_ORIGINS JSON list is empty, using default"]);

        let mut warnings = Vec::new();
        parse_cors_origins(",,,", &mut warnings);
        assert_eq!(
            warnings,
            vec!["No valid origins found in CORS_ORIGINS, using default"]
        );
    }

    #[test]
    fn test_cors_malformed_json_uses_comma_split() {
        let mut warnings = Vec::new();
        assert_eq!(
            parse_cors_origins("[http://a.test, http://b.test]", &mut warnings),
            vec!["[http://a.test", "http://b.test]"]
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse CORS_ORIGINS as JSON"));
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert!(!settings.development_mode);
        assert_eq!(settings.api_key_header, "X-API-Key");
        assert_eq!(settings.max_request_size, 1_048_576);
        assert_eq!(settings.max_question_length, 500);
        assert_eq!(settings.rate_limits, RateLimitConfig::default());
        assert_eq!(settings.cors_origins, vec![DEFAULT_CORS_ORIGIN]);
        assert_eq!(settings.vector_db.top_k, 5);
        assert_eq!(settings.llm.temperature, 0.0);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = settings_from(&[
            ("ENVIRONMENT", "Development"),
            ("API_KEY", "secret-key"),
            ("API_KEY_HEADER", "X-Clinic-Key"),
            ("MAX_QUESTION_LENGTH", "120"),
            ("RATE_LIMIT_CHAT", "10/Hour"),
            ("RATE_LIMIT_GENERATE", "ten/minute"),
            ("OPENAI_BASE_URL", "http://localhost:4000/v1/"),
        ])
        .unwrap();

        assert!(settings.development_mode);
        assert_eq!(settings.api_key.expose(), "secret-key");
        assert_eq!(settings.api_key_header, "X-Clinic-Key");
        assert_eq!(settings.max_question_length, 120);
        assert_eq!(settings.rate_limits.chat, RateLimit::new(10, RatePeriod::Hour));
        assert_eq!(settings.rate_limits.generate, RateLimitConfig::DEFAULT_GENERATE);
        assert_eq!(settings.llm.base_url, "http://localhost:4000/v1");
    }

    #[test]
    fn test_fallbacks_collected_as_warnings() {
        let settings = settings_from(&[
            ("RATE_LIMIT_GENERATE", "bogus"),
            ("RATE_LIMIT_CHAT", "5/minute"),
            ("CORS_ORIGINS", "[]"),
        ])
        .unwrap();

        assert_eq!(settings.warnings.len(), 2);
        assert!(settings.warnings[0].starts_with("CORS_ORIGINS JSON list is empty"));
        assert!(settings.warnings[1].starts_with("Invalid RATE_LIMIT_GENERATE value \"bogus\""));

        assert!(settings_from(&[]).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_logging_overrides() {
        let settings = settings_from(&[
            ("LOG_LEVEL", "WARN"),
            ("LOG_FILE_LEVEL", "trace"),
            ("LOG_MAX_BYTES", "2048"),
            ("LOG_BACKUPS", "2"),
        ])
        .unwrap();

        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.file_level, "trace");
        assert_eq!(settings.logging.max_file_size, 2048);
        assert_eq!(settings.logging.max_backups, 2);

        let defaults = settings_from(&[]).unwrap().logging;
        assert_eq!(defaults.file_level, "debug");
        assert_eq!(defaults.max_file_size, 10 * 1024 * 1024);
        assert_eq!(defaults.max_backups, 5);
    }

    #[test]
    fn test_malformed_number_is_fatal() {
        let err = settings_from(&[("MAX_REQUEST_SIZE", "1MB")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_secret_debug_is_masked() {
        let secret = Secret::new("super-secret-value");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("secret-val"));
        assert!(debug.starts_with("Secret(su"));
    }
}
