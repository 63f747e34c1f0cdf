use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use marketplace_core::DEFAULT_API_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the marketplace API
    pub api_url: ConfigValue<String>,
    /// Where the signed-in session is kept
    pub session_path: ConfigValue<PathBuf>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    session_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading environment variables through `env`.
    fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut api_url = ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default);
        let mut session_path = ConfigValue::new(
            Self::default_data_dir().join("session.json"),
            ConfigSource::Default,
        );
        let mut request_timeout_secs =
            ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(session) = file_config.session_path {
                // Resolve relative paths against config file's directory
                let resolved = if session.is_relative() {
                    path.parent().map(|p| p.join(&session)).unwrap_or(session)
                } else {
                    session
                };
                session_path = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        if let Some(url) = env("MARKET_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Some(session) = env("MARKET_SESSION_PATH") {
            session_path = ConfigValue::new(PathBuf::from(session), ConfigSource::Environment);
        }
        if let Some(secs) = env("MARKET_REQUEST_TIMEOUT") {
            let secs = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MARKET_REQUEST_TIMEOUT", secs.clone()))?;
            request_timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            api_url,
            session_path,
            request_timeout_secs,
            config_file,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/market/
    /// - macOS: ~/Library/Application Support/market/
    /// - Windows: %APPDATA%/market/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("market")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/market/
    /// - macOS: ~/Library/Application Support/market/
    /// - Windows: %APPDATA%/market/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("market")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(config.api_url.value, "http://127.0.0.1:5000/api");
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert!(config.session_path.value.ends_with("market/session.json"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: https://market.example.com/api").unwrap();
        writeln!(file, "session_path: /custom/session.json").unwrap();
        writeln!(file, "request_timeout_secs: 30").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.api_url.value, "https://market.example.com/api");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert_eq!(
            config.session_path.value,
            PathBuf::from("/custom/session.json")
        );
        assert_eq!(config.request_timeout_secs.value, 30);
        assert_eq!(config.request_timeout_secs.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_session_path_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "session_path: state/session.json\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(
            config.session_path.value,
            temp_dir.path().join("state/session.json")
        );
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: http://fromfile/api").unwrap();

        let config = Config::load_with_env(Some(config_path), |key| match key {
            "MARKET_API_URL" => Some("http://fromenv/api".to_string()),
            "MARKET_REQUEST_TIMEOUT" => Some(" 4 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_url.value, "http://fromenv/api");
        assert_eq!(config.api_url.source, ConfigSource::Environment);
        assert_eq!(config.request_timeout_secs.value, 4);
        assert_eq!(config.session_path.source, ConfigSource::Default);
    }

    #[test]
    fn test_invalid_env_timeout() {
        let temp_dir = tempdir().unwrap();
        let err = Config::load_with_env(Some(temp_dir.path().join("missing.yaml")), |key| {
            (key == "MARKET_REQUEST_TIMEOUT").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for MARKET_REQUEST_TIMEOUT: 'soon'");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_partial_file_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "request_timeout_secs: 3").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert_eq!(config.session_path.source, ConfigSource::Default);
        assert_eq!(config.request_timeout_secs.value, 3);
    }
}
