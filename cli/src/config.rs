use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

const MIN_SAMPLE_INTERVAL_SECS: u64 = 5;
const MAX_SAMPLE_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_level(&self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Which hardware sources feed the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub summary: bool,
    pub detailed: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            summary: true,
            detailed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub sample_interval_secs: u64,
    pub sources: SourcesConfig,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 300,
            sources: SourcesConfig::default(),
        }
    }
}

impl SamplerConfig {
    /// The configured interval, kept within the supported 5s..1h range.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(
            self.sample_interval_secs
                .clamp(MIN_SAMPLE_INTERVAL_SECS, MAX_SAMPLE_INTERVAL_SECS),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Overrides the default database location.
    pub database_path: Option<PathBuf>,
}

impl HistoryConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join(crate::data::history_store::DATABASE_NAME))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub log_level: LogLevel,
    pub sampler: SamplerConfig,
    pub history: HistoryConfig,
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("batlog")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("batlog")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("batlog")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl UserConfig {
    /// Load the user config. A missing file means defaults; an unreadable
    /// or invalid file is returned as an error for the caller to report.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(&config_path())
    }

    pub fn load_or_default(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line overrides. Returns true if the interval came from
    /// the command line.
    pub fn merge_with_args(&mut self, interval: Option<Duration>) -> bool {
        match interval {
            Some(d) => {
                self.sampler.sample_interval_secs = d.as_secs();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: UserConfig = toml::from_str(
            r#"
            [sampler]
            sample_interval_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.sampler.sample_interval_secs, 30);
        assert_eq!(config.sampler.sources, SourcesConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.history.database_path, None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = UserConfig::default();
        config.log_level = LogLevel::Debug;
        config.sampler.sources.detailed = false;
        config.history.database_path = Some(PathBuf::from("/var/lib/batlog/history.db"));
        config.save_to(&path).unwrap();

        assert_eq!(UserConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sampler = 12").unwrap();

        assert!(matches!(
            UserConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(
            UserConfig::load_or_default(&path).unwrap(),
            UserConfig::default()
        );

        fs::write(&path, "sampler = 12").unwrap();
        assert!(matches!(
            UserConfig::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_interval_is_clamped() {
        let mut sampler = SamplerConfig::default();
        assert_eq!(sampler.interval(), Duration::from_secs(300));

        sampler.sample_interval_secs = 1;
        assert_eq!(sampler.interval(), Duration::from_secs(5));

        sampler.sample_interval_secs = 86_400;
        assert_eq!(sampler.interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = UserConfig::default();
        assert!(!config.merge_with_args(None));
        assert_eq!(config.sampler.sample_interval_secs, 300);

        assert!(config.merge_with_args(Some(Duration::from_secs(30))));
        assert_eq!(config.sampler.sample_interval_secs, 30);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("loud"), None);
        assert_eq!(LogLevel::Off.as_tracing_level(), None);
        assert_eq!(LogLevel::Trace.as_tracing_level(), Some(Level::TRACE));
    }
}
