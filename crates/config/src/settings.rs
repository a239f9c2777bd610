//! Main settings module

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{paths, DEFAULT_MIN_CONFIDENCE, NAVIGATION_TEMPLATES, PAGE_PLACEHOLDER, PARAM_KEYWORDS};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Site and model storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Knowledge base location
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Corpus synthesis and inference tuning
    #[serde(default)]
    pub nlu: NluConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_storage()?;
        self.validate_nlu()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_storage(&self) -> Result<(), ConfigError> {
        if self.storage.sites_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.sites_dir".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if self.storage.models_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.models_dir".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_nlu(&self) -> Result<(), ConfigError> {
        let nlu = &self.nlu;

        if !(0.0..=1.0).contains(&nlu.min_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "nlu.min_confidence".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", nlu.min_confidence),
            });
        }

        if nlu.templates.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nlu.templates".to_string(),
                message: "At least one navigation template is required".to_string(),
            });
        }

        if let Some(bad) = nlu.templates.iter().find(|t| !t.contains(PAGE_PLACEHOLDER)) {
            return Err(ConfigError::InvalidValue {
                field: "nlu.templates".to_string(),
                message: format!("Template {:?} is missing {}", bad, PAGE_PLACEHOLDER),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS restrictions (false = permissive)
    #[serde(default)]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: false,
            cors_origins: Vec::new(),
        }
    }
}

/// Where site records and model artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_sites_dir")]
    pub sites_dir: PathBuf,

    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
}

fn default_sites_dir() -> PathBuf {
    PathBuf::from(paths::SITES_DIR)
}
fn default_models_dir() -> PathBuf {
    PathBuf::from(paths::MODELS_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sites_dir: default_sites_dir(),
            models_dir: default_models_dir(),
        }
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path to the knowledge base JSON file
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    /// Load at startup instead of on first use
    #[serde(default = "default_true")]
    pub preload: bool,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from(paths::KNOWLEDGE_BASE)
}
fn default_true() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            preload: true,
        }
    }
}

/// Corpus synthesis and inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    /// Scores below this are reported as unrecognized
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Navigation templates; each must contain `%page%`
    #[serde(default = "default_templates")]
    pub templates: Vec<String>,

    /// Param name -> spoken aliases
    #[serde(default = "default_param_keywords")]
    pub param_keywords: BTreeMap<String, Vec<String>>,
}

fn default_min_confidence() -> f32 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_templates() -> Vec<String> {
    NAVIGATION_TEMPLATES.iter().map(|t| t.to_string()).collect()
}

fn default_param_keywords() -> BTreeMap<String, Vec<String>> {
    PARAM_KEYWORDS
        .iter()
        .map(|(param, keywords)| {
            (
                param.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            templates: default_templates(),
            param_keywords: default_param_keywords(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(config_dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SITE_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        config_dir = %config_dir.display(),
        env = env.unwrap_or("default"),
        "Settings loaded"
    );

    Ok(settings)
}
