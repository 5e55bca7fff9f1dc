use crate::config::Environment;
use crate::utils::error::{RekognizerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub facenet: FacenetConfig,
    pub detector: DetectorConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "wildcard")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "wildcard")]
    pub allowed_methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub connect_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacenetConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_signature_name")]
    pub signature_name: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub endpoint: String,
    #[serde(default)]
    pub min_confidence: f32,
    #[serde(default)]
    pub margin: u32,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    pub max_image_width: Option<u32>,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_concurrent_fetches")]
    pub concurrent_fetches: usize,
    pub timeout_seconds: Option<u64>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_model_name() -> String {
    "facenet".to_string()
}

fn default_signature_name() -> String {
    "calculate_embeddings".to_string()
}

fn default_threshold() -> f64 {
    crate::core::similarity::THRESHOLD
}

fn default_image_size() -> u32 {
    160
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_concurrent_fetches() -> usize {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: wildcard(),
            allowed_methods: wildcard(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_image_width: None,
            max_bytes: default_max_bytes(),
            concurrent_fetches: default_concurrent_fetches(),
            timeout_seconds: None,
        }
    }
}

impl FacenetConfig {
    pub fn predict_url(&self) -> String {
        format!(
            "http://{}:{}/v1/models/{}:predict",
            self.host, self.port, self.model_name
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(30))
    }
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(30))
    }
}

impl ImagesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(10))
    }
}

impl DatabaseConfig {
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(5)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds.unwrap_or(5))
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RekognizerError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RekognizerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RekognizerError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.bind_address", &self.server.bind_address)?;
        validation::validate_resolved("server.bind_address", &self.server.bind_address)?;

        validation::validate_resolved("database.url", &self.database.url)?;
        if !(self.database.url.starts_with("postgres://")
            || self.database.url.starts_with("postgresql://"))
        {
            return Err(RekognizerError::InvalidConfigValueError {
                field: "database.url".to_string(),
                value: self.database.url.clone(),
                reason: "Expected a postgres:// connection string".to_string(),
            });
        }
        validation::validate_positive_number(
            "database.max_connections",
            self.database.max_connections() as usize,
            1,
        )?;

        validation::validate_resolved("facenet.host", &self.facenet.host)?;
        validation::validate_url("facenet.host", &self.facenet.predict_url())?;
        validation::validate_range("facenet.threshold", self.facenet.threshold, 0.0, 4.0)?;
        validation::validate_positive_number(
            "facenet.image_size",
            self.facenet.image_size as usize,
            1,
        )?;

        validation::validate_resolved("detector.endpoint", &self.detector.endpoint)?;
        validation::validate_url("detector.endpoint", &self.detector.endpoint)?;

        validation::validate_positive_number(
            "images.concurrent_fetches",
            self.images.concurrent_fetches,
            1,
        )?;
        if let Some(width) = self.images.max_image_width {
            validation::validate_positive_number("images.max_image_width", width as usize, 1)?;
        }

        for method in &self.cors.allowed_methods {
            if method != "*" && method.parse::<axum::http::Method>().is_err() {
                return Err(RekognizerError::InvalidConfigValueError {
                    field: "cors.allowed_methods".to_string(),
                    value: method.clone(),
                    reason: "Not an HTTP method".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
