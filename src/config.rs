//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AgentError, Result};

/// Default OpenRouter-compatible API base URL.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default model for the tool-selection (decision) role.
const DEFAULT_DECISION_MODEL: &str = "mistralai/mistral-7b-instruct-v0.2";
/// Default model for the answer-generation role.
const DEFAULT_ANSWER_MODEL: &str = "mistralai/mistral-7b-instruct-v0.2";
/// Default weather API base URL.
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Default credential cooldown in minutes.
const DEFAULT_COOLDOWN_MINUTES: u64 = 5;
/// Default generation request timeout in seconds.
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 90;
/// Default weather request timeout in seconds.
const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
/// Default retry budget per generation call.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before rotating to the next key after a rate limit.
const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 1;
/// Default delay before retrying after a generic transport error.
const DEFAULT_RETRY_DELAY_SECS: u64 = 3;
/// Default nearest-neighbor results per knowledge-base search.
const DEFAULT_SEARCH_TOP_K: usize = 3;
/// Default similarity acceptance threshold.
const DEFAULT_SEARCH_THRESHOLD: f32 = 0.35;
/// Default embedding dimension (matches the offline index build).
const DEFAULT_EMBEDDING_DIM: usize = 768;
/// Default city for weather lookups.
const DEFAULT_CITY: &str = "Hyderabad";
/// Default region for water/irrigation lookups.
const DEFAULT_REGION: &str = "Telangana";

/// Ordered crop/commodity candidates scanned against the question to
/// derive market and pest tool arguments. First match wins.
const DEFAULT_TOPIC_CANDIDATES: [&str; 8] = [
    "rice", "wheat", "cotton", "tomato", "maize", "paddy", "chili", "mango",
];

/// Configuration for the agent pipeline.
#[derive(Debug, Clone)]
pub struct AgriConfig {
    /// Generation API keys, in rotation order.
    pub api_keys: Vec<String>,
    /// Generation API base URL.
    pub base_url: String,
    /// Model for the tool-selection role.
    pub decision_model: String,
    /// Model for the answer-generation role.
    pub answer_model: String,
    /// Weather API key.
    pub weather_api_key: String,
    /// Weather API base URL.
    pub weather_base_url: String,
    /// Path to the prebuilt vector index.
    pub index_path: PathBuf,
    /// Path to the parallel document store.
    pub metadata_path: PathBuf,
    /// Path to the commodity price CSV.
    pub market_prices_path: PathBuf,
    /// Cooldown applied to a rate-limited credential.
    pub key_cooldown: Duration,
    /// Timeout for generation requests.
    pub generation_timeout: Duration,
    /// Timeout for weather requests.
    pub weather_timeout: Duration,
    /// Retry budget per generation call.
    pub max_retries: u32,
    /// Delay before rotating keys after a rate limit.
    pub rate_limit_delay: Duration,
    /// Delay before retrying after a generic transport error.
    pub retry_delay: Duration,
    /// Nearest-neighbor results per knowledge-base search.
    pub search_top_k: usize,
    /// Similarity acceptance threshold.
    pub search_threshold: f32,
    /// Embedding dimension (must match the offline index build).
    pub embedding_dim: usize,
    /// Default city for weather lookups.
    pub default_city: String,
    /// Default region for water/irrigation lookups.
    pub default_region: String,
    /// Ordered crop/commodity candidates for argument detection.
    pub topic_candidates: Vec<String>,
}

impl AgriConfig {
    /// Creates a new builder for `AgriConfig`.
    #[must_use]
    pub fn builder() -> AgriConfigBuilder {
        AgriConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no generation API key is found.
    pub fn from_env() -> Result<Self> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgriConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgriConfigBuilder {
    api_keys: Option<Vec<String>>,
    base_url: Option<String>,
    decision_model: Option<String>,
    answer_model: Option<String>,
    weather_api_key: Option<String>,
    weather_base_url: Option<String>,
    index_path: Option<PathBuf>,
    metadata_path: Option<PathBuf>,
    market_prices_path: Option<PathBuf>,
    key_cooldown: Option<Duration>,
    generation_timeout: Option<Duration>,
    weather_timeout: Option<Duration>,
    max_retries: Option<u32>,
    rate_limit_delay: Option<Duration>,
    retry_delay: Option<Duration>,
    search_top_k: Option<usize>,
    search_threshold: Option<f32>,
    embedding_dim: Option<usize>,
    default_city: Option<String>,
    default_region: Option<String>,
    topic_candidates: Option<Vec<String>>,
}

impl AgriConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_keys.is_none() {
            // OPENROUTER_API_KEYS is a comma-separated list; fall back to
            // the singular variable.
            let keys: Vec<String> = std::env::var("OPENROUTER_API_KEYS")
                .map(|joined| {
                    joined
                        .split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(String::from)
                        .collect()
                })
                .or_else(|_| std::env::var("OPENROUTER_API_KEY").map(|k| vec![k.trim().to_string()]))
                .unwrap_or_default();
            if !keys.is_empty() {
                self.api_keys = Some(keys);
            }
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENROUTER_BASE_URL").ok();
        }
        if self.decision_model.is_none() {
            self.decision_model = std::env::var("AGRI_DECISION_MODEL").ok();
        }
        if self.answer_model.is_none() {
            self.answer_model = std::env::var("AGRI_ANSWER_MODEL").ok();
        }
        if self.weather_api_key.is_none() {
            self.weather_api_key = std::env::var("OPENWEATHER_API_KEY").ok();
        }
        if self.index_path.is_none() {
            self.index_path = std::env::var("AGRI_INDEX_PATH").ok().map(PathBuf::from);
        }
        if self.metadata_path.is_none() {
            self.metadata_path = std::env::var("AGRI_METADATA_PATH").ok().map(PathBuf::from);
        }
        if self.market_prices_path.is_none() {
            self.market_prices_path = std::env::var("AGRI_MARKET_PRICES_PATH")
                .ok()
                .map(PathBuf::from);
        }
        if self.key_cooldown.is_none() {
            self.key_cooldown = std::env::var("AGRI_KEY_COOLDOWN_MINUTES")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|minutes| Duration::from_secs(minutes * 60));
        }
        self
    }

    /// Sets the generation API keys.
    #[must_use]
    pub fn api_keys(mut self, keys: Vec<String>) -> Self {
        self.api_keys = Some(keys);
        self
    }

    /// Sets the generation API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the decision model.
    #[must_use]
    pub fn decision_model(mut self, model: impl Into<String>) -> Self {
        self.decision_model = Some(model.into());
        self
    }

    /// Sets the answer model.
    #[must_use]
    pub fn answer_model(mut self, model: impl Into<String>) -> Self {
        self.answer_model = Some(model.into());
        self
    }

    /// Sets the weather API key.
    #[must_use]
    pub fn weather_api_key(mut self, key: impl Into<String>) -> Self {
        self.weather_api_key = Some(key.into());
        self
    }

    /// Sets the weather API base URL.
    #[must_use]
    pub fn weather_base_url(mut self, url: impl Into<String>) -> Self {
        self.weather_base_url = Some(url.into());
        self
    }

    /// Sets the vector index path.
    #[must_use]
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    /// Sets the document store path.
    #[must_use]
    pub fn metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_path = Some(path.into());
        self
    }

    /// Sets the commodity price CSV path.
    #[must_use]
    pub fn market_prices_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.market_prices_path = Some(path.into());
        self
    }

    /// Sets the credential cooldown.
    #[must_use]
    pub const fn key_cooldown(mut self, cooldown: Duration) -> Self {
        self.key_cooldown = Some(cooldown);
        self
    }

    /// Sets the generation request timeout.
    #[must_use]
    pub const fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    /// Sets the weather request timeout.
    #[must_use]
    pub const fn weather_timeout(mut self, timeout: Duration) -> Self {
        self.weather_timeout = Some(timeout);
        self
    }

    /// Sets the retry budget per generation call.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the delay before rotating keys after a rate limit.
    #[must_use]
    pub const fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = Some(delay);
        self
    }

    /// Sets the delay before retrying after a generic transport error.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets the nearest-neighbor results per search.
    #[must_use]
    pub const fn search_top_k(mut self, k: usize) -> Self {
        self.search_top_k = Some(k);
        self
    }

    /// Sets the similarity acceptance threshold.
    #[must_use]
    pub const fn search_threshold(mut self, threshold: f32) -> Self {
        self.search_threshold = Some(threshold);
        self
    }

    /// Sets the embedding dimension.
    #[must_use]
    pub const fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = Some(dim);
        self
    }

    /// Sets the default city for weather lookups.
    #[must_use]
    pub fn default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = Some(city.into());
        self
    }

    /// Sets the default region for water lookups.
    #[must_use]
    pub fn default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    /// Sets the ordered crop/commodity candidate list.
    #[must_use]
    pub fn topic_candidates(mut self, candidates: Vec<String>) -> Self {
        self.topic_candidates = Some(candidates);
        self
    }

    /// Builds the [`AgriConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no generation API key was set.
    pub fn build(self) -> Result<AgriConfig> {
        let api_keys = self.api_keys.filter(|k| !k.is_empty());
        let api_keys = api_keys.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgriConfig {
            api_keys,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            decision_model: self
                .decision_model
                .unwrap_or_else(|| DEFAULT_DECISION_MODEL.to_string()),
            answer_model: self
                .answer_model
                .unwrap_or_else(|| DEFAULT_ANSWER_MODEL.to_string()),
            weather_api_key: self.weather_api_key.unwrap_or_default(),
            weather_base_url: self
                .weather_base_url
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            index_path: self
                .index_path
                .unwrap_or_else(|| PathBuf::from("index/vectors.json")),
            metadata_path: self
                .metadata_path
                .unwrap_or_else(|| PathBuf::from("index/documents.json")),
            market_prices_path: self
                .market_prices_path
                .unwrap_or_else(|| PathBuf::from("data/day_prices.csv")),
            key_cooldown: self
                .key_cooldown
                .unwrap_or(Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60)),
            generation_timeout: self
                .generation_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS)),
            weather_timeout: self
                .weather_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_WEATHER_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            rate_limit_delay: self
                .rate_limit_delay
                .unwrap_or(Duration::from_secs(DEFAULT_RATE_LIMIT_DELAY_SECS)),
            retry_delay: self
                .retry_delay
                .unwrap_or(Duration::from_secs(DEFAULT_RETRY_DELAY_SECS)),
            search_top_k: self.search_top_k.unwrap_or(DEFAULT_SEARCH_TOP_K),
            search_threshold: self.search_threshold.unwrap_or(DEFAULT_SEARCH_THRESHOLD),
            embedding_dim: self.embedding_dim.unwrap_or(DEFAULT_EMBEDDING_DIM),
            default_city: self.default_city.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            default_region: self
                .default_region
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            topic_candidates: self.topic_candidates.unwrap_or_else(|| {
                DEFAULT_TOPIC_CANDIDATES
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
        })
    }
}
