use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Configuration {
    pub tmdb: TmdbConfig,
    pub suggestions: Option<SuggestionConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(rename = "apikey")]
    pub api_key: String,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "imageBaseUrl")]
    pub image_base_url: Option<String>,
    #[serde(rename = "castLimit")]
    pub cast_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SuggestionConfig {
    #[serde(rename = "debounceMs")]
    pub debounce_ms: Option<u64>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            image_base_url: None,
            cast_limit: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_TMDB_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url.as_deref().unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    pub fn cast_limit(&self) -> usize {
        self.cast_limit.unwrap_or(5)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(10))
    }
}

impl Configuration {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Configuration = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb.api_key.trim().is_empty() {
            anyhow::bail!("tmdb.apikey must not be empty");
        }
        url::Url::parse(self.tmdb.base_url())
            .map_err(|e| anyhow::anyhow!("Invalid tmdb.baseUrl '{}': {}", self.tmdb.base_url(), e))?;
        url::Url::parse(self.tmdb.image_base_url()).map_err(|e| {
            anyhow::anyhow!("Invalid tmdb.imageBaseUrl '{}': {}", self.tmdb.image_base_url(), e)
        })?;
        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(
            self.suggestions
                .as_ref()
                .and_then(|s| s.debounce_ms)
                .unwrap_or(300),
        )
    }

    pub fn max_suggestions(&self) -> usize {
        self.suggestions
            .as_ref()
            .and_then(|s| s.max_results)
            .unwrap_or(10)
    }

    pub fn request_timeout(&self) -> Duration {
        self.http.clone().unwrap_or_default().timeout()
    }
}
