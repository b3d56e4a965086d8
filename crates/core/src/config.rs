use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "hrflow.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token issued at login; pass-through only, never minted here.
    pub token: SecretString,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    backend: FileBackend,
    #[serde(default)]
    logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
struct FileBackend {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_owned(),
                timeout_secs: 30,
                token: String::new().into(),
            },
            logging: LoggingConfig { level: "info".to_owned(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    /// Load configuration with precedence env > file > default.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = options
            .config_path
            .clone()
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));

        if let Some(path) = path {
            if path.exists() {
                config.apply_file(&Self::read_file(&path)?);
            } else if options.require_file {
                return Err(ConfigError::MissingConfigFile(path));
            }
        } else if options.require_file {
            return Err(ConfigError::MissingConfigFile(PathBuf::from(DEFAULT_CONFIG_FILE)));
        }

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    fn apply_file(&mut self, file: &FileConfig) {
        if let Some(base_url) = &file.backend.base_url {
            self.backend.base_url = base_url.clone();
        }
        if let Some(timeout_secs) = file.backend.timeout_secs {
            self.backend.timeout_secs = timeout_secs;
        }
        if let Some(token) = &file.backend.token {
            self.backend.token = token.clone().into();
        }
        if let Some(level) = &file.logging.level {
            self.logging.level = level.clone();
        }
        if let Some(format) = file.logging.format {
            self.logging.format = format;
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(base_url) = lookup("HRFLOW_BACKEND_BASE_URL") {
            self.backend.base_url = base_url;
        }
        if let Some(raw) = lookup("HRFLOW_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs =
                raw.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "HRFLOW_BACKEND_TIMEOUT_SECS".to_owned(),
                    value: raw,
                })?;
        }
        if let Some(token) = lookup("HRFLOW_TOKEN") {
            self.backend.token = token.into();
        }
        if let Some(level) = lookup("HRFLOW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(raw) = lookup("HRFLOW_LOG_FORMAT") {
            self.logging.format =
                raw.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "HRFLOW_LOG_FORMAT".to_owned(),
                    value: raw,
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must be an http(s) URL, got `{base_url}`"
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.timeout_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
