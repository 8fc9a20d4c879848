//! Configuration management.
//!
//! Configuration comes from a TOML file (see [`ConfigFile`]) with
//! environment variable overrides applied on top. Every field has a default,
//! so running without a file is fine.

use crate::classifier::ClassifierOptions;
use crate::news::{DEFAULT_BASE_URL, NewsApiClient, NewsHttpConfig, NewsRepository};
use crate::storage::DATABASE_FILE;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for asclepius.
#[derive(Debug, Clone, PartialEq)]
pub struct AsclepiusConfig {
    /// Directory holding the history database (and optionally the model).
    pub data_dir: PathBuf,
    /// Model and ranking options.
    pub classifier: ClassifierOptions,
    /// News API settings.
    pub news: NewsSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// News API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsSettings {
    /// Base URL of the news API.
    pub base_url: String,
    /// API key sent as the `apiKey` query parameter.
    pub api_key: String,
    /// HTTP timeouts.
    pub http: NewsHttpConfig,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            http: NewsHttpConfig::default(),
        }
    }
}

impl NewsSettings {
    /// Builds the repository described by these settings.
    #[must_use]
    pub fn repository(&self) -> NewsRepository {
        NewsRepository::new(NewsApiClient::new(
            self.base_url.clone(),
            self.api_key.clone(),
            self.http,
        ))
    }
}

/// Logging settings as read from the config file.
///
/// Turned into an [`crate::observability::LoggingConfig`] at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `asclepius=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Classifier section.
    pub classifier: Option<ConfigFileClassifier>,
    /// News section.
    pub news: Option<ConfigFileNews>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// `[classifier]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileClassifier {
    /// Model file.
    pub model_path: Option<String>,
    /// Minimum score.
    pub threshold: Option<f32>,
    /// Maximum number of categories (0 = no limit).
    pub max_results: Option<usize>,
    /// Square input edge length.
    pub input_size: Option<u32>,
    /// Labels in model output order.
    pub labels: Option<Vec<String>>,
}

/// `[news]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileNews {
    /// API base URL.
    pub base_url: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// `[logging]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

impl Default for AsclepiusConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            classifier: ClassifierOptions::default(),
            news: NewsSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".asclepius"),
        |dirs| dirs.data_dir().join("asclepius"),
    )
}

impl AsclepiusConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/asclepius/` on macOS)
    /// 2. XDG config dir (`~/.config/asclepius/`)
    ///
    /// Returns the default configuration if no readable file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("asclepius").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("asclepius")
                .join("config.toml"),
        ];

        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %candidate.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(classifier) = file.classifier {
            if let Some(model_path) = classifier.model_path {
                config.classifier.model_path = PathBuf::from(model_path);
            }
            if let Some(threshold) = classifier.threshold {
                config.classifier.threshold = threshold;
            }
            if let Some(max_results) = classifier.max_results {
                config.classifier.max_results = max_results;
            }
            if let Some(input_size) = classifier.input_size {
                config.classifier.input_size = input_size;
            }
            if let Some(labels) = classifier.labels {
                config.classifier.labels = labels;
            }
        }
        if let Some(news) = file.news {
            if let Some(base_url) = news.base_url {
                config.news.base_url = base_url;
            }
            if let Some(api_key) = news.api_key {
                config.news.api_key = api_key;
            }
            if let Some(timeout_ms) = news.timeout_ms {
                config.news.http.timeout_ms = timeout_ms;
            }
            if let Some(connect_timeout_ms) = news.connect_timeout_ms {
                config.news.http.connect_timeout_ms = connect_timeout_ms;
            }
        }
        if let Some(logging) = file.logging {
            config.logging.format = logging.format;
            config.logging.filter = logging.filter;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }

    /// Applies environment variable overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ASCLEPIUS_DATA_DIR` | `data_dir` |
    /// | `ASCLEPIUS_MODEL_PATH` | `classifier.model_path` |
    /// | `ASCLEPIUS_THRESHOLD` | `classifier.threshold` |
    /// | `ASCLEPIUS_MAX_RESULTS` | `classifier.max_results` |
    /// | `NEWS_API_URL` | `news.base_url` |
    /// | `NEWS_API_KEY` | `news.api_key` |
    /// | `ASCLEPIUS_NEWS_TIMEOUT_MS` | `news.http.timeout_ms` |
    /// | `ASCLEPIUS_NEWS_CONNECT_TIMEOUT_MS` | `news.http.connect_timeout_ms` |
    ///
    /// Unparseable numeric values are ignored.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("ASCLEPIUS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("ASCLEPIUS_MODEL_PATH") {
            self.classifier.model_path = PathBuf::from(path);
        }
        if let Some(threshold) = get("ASCLEPIUS_THRESHOLD").and_then(|v| v.trim().parse().ok()) {
            self.classifier.threshold = threshold;
        }
        if let Some(max) = get("ASCLEPIUS_MAX_RESULTS").and_then(|v| v.trim().parse().ok()) {
            self.classifier.max_results = max;
        }
        if let Some(url) = get("NEWS_API_URL") {
            self.news.base_url = url;
        }
        if let Some(key) = get("NEWS_API_KEY") {
            self.news.api_key = key;
        }
        if let Some(ms) = get("ASCLEPIUS_NEWS_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
            self.news.http.timeout_ms = ms;
        }
        if let Some(ms) =
            get("ASCLEPIUS_NEWS_CONNECT_TIMEOUT_MS").and_then(|v| v.trim().parse().ok())
        {
            self.news.http.connect_timeout_ms = ms;
        }

        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Path of the history database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Resolves the model file.
    ///
    /// Absolute paths are used as given. A relative path is looked up in the
    /// current directory first and then in the data directory.
    #[must_use]
    pub fn resolved_model_path(&self) -> PathBuf {
        let path = &self.classifier.model_path;
        if path.is_absolute() || path.exists() {
            return path.clone();
        }
        let in_data_dir = self.data_dir.join(path);
        if in_data_dir.exists() {
            in_data_dir
        } else {
            path.clone()
        }
    }

    /// Classifier options with the model path resolved.
    #[must_use]
    pub fn classifier_options(&self) -> ClassifierOptions {
        self.classifier
            .clone()
            .with_model_path(self.resolved_model_path())
    }
}
