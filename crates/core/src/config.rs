use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::insights::ranking::DEFAULT_TOP_N;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub insights: InsightsConfig,
    pub stock: StockConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct InsightsConfig {
    pub top_n: usize,
}

#[derive(Clone, Debug)]
pub struct StockConfig {
    /// Optional `item,stock_qty` CSV feed; the placeholder flat stock level
    /// is used when absent.
    pub csv_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub top_n: Option<usize>,
    pub stock_csv_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            insights: InsightsConfig { top_n: DEFAULT_TOP_N },
            stock: StockConfig { csv_path: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Loads configuration with the usual precedence: defaults, then the
    /// config file, then `TIFFINSIGHT_*` environment variables, then
    /// programmatic overrides; validation fails fast afterwards.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("tiffinsight.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(insights) = patch.insights {
            if let Some(top_n) = insights.top_n {
                self.insights.top_n = top_n;
            }
        }

        if let Some(stock) = patch.stock {
            if let Some(csv_path) = stock.csv_path {
                self.stock.csv_path = Some(csv_path);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TIFFINSIGHT_INSIGHTS_TOP_N") {
            self.insights.top_n = parse_usize("TIFFINSIGHT_INSIGHTS_TOP_N", &value)?;
        }
        if let Some(value) = read_env("TIFFINSIGHT_STOCK_CSV_PATH") {
            self.stock.csv_path = Some(PathBuf::from(value));
        }

        let log_level =
            read_env("TIFFINSIGHT_LOGGING_LEVEL").or_else(|| read_env("TIFFINSIGHT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TIFFINSIGHT_LOGGING_FORMAT").or_else(|| read_env("TIFFINSIGHT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(top_n) = overrides.top_n {
            self.insights.top_n = top_n;
        }
        if let Some(stock_csv_path) = overrides.stock_csv_path {
            self.stock.csv_path = Some(stock_csv_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.insights.top_n == 0 {
            return Err(ConfigError::Validation(
                "insights.top_n must be greater than zero".to_string(),
            ));
        }
        if self.insights.top_n > 100 {
            return Err(ConfigError::Validation(
                "insights.top_n must be at most 100".to_string(),
            ));
        }

        if let Some(csv_path) = &self.stock.csv_path {
            if csv_path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "stock.csv_path must not be empty when set".to_string(),
                ));
            }
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("tiffinsight.toml"), PathBuf::from("config/tiffinsight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    insights: Option<InsightsPatch>,
    stock: Option<StockPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsPatch {
    top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct StockPatch {
    csv_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_are_valid() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars(&[
            "TIFFINSIGHT_INSIGHTS_TOP_N",
            "TIFFINSIGHT_STOCK_CSV_PATH",
            "TIFFINSIGHT_LOGGING_LEVEL",
            "TIFFINSIGHT_LOG_LEVEL",
            "TIFFINSIGHT_LOGGING_FORMAT",
            "TIFFINSIGHT_LOG_FORMAT",
        ]);

        let config = AppConfig::load(LoadOptions::default()).expect("defaults load");
        assert_eq!(config.insights.top_n, 5);
        assert_eq!(config.stock.csv_path, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn precedence_defaults_file_env_overrides() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars(&["TIFFINSIGHT_LOGGING_LEVEL", "TIFFINSIGHT_LOG_LEVEL"]);
        env::set_var("TIFFINSIGHT_INSIGHTS_TOP_N", "7");

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("tiffinsight.toml");
        fs::write(
            &path,
            r#"
[insights]
top_n = 3

[logging]
level = "warn"
"#,
        )
        .expect("write config file");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            overrides: ConfigOverrides {
                log_level: Some("debug".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config loads");

        // Env beats the file; the programmatic override beats both.
        assert_eq!(config.insights.top_n, 7);
        assert_eq!(config.logging.level, "debug");

        clear_vars(&["TIFFINSIGHT_INSIGHTS_TOP_N"]);
    }

    #[test]
    fn log_format_aliases_are_supported() {
        let _guard = env_lock().lock().expect("env lock");
        env::set_var("TIFFINSIGHT_LOG_FORMAT", "json");

        let config = AppConfig::load(LoadOptions::default()).expect("config loads");
        assert_eq!(config.logging.format, LogFormat::Json);

        clear_vars(&["TIFFINSIGHT_LOG_FORMAT"]);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect_err("missing file should fail");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn zero_top_n_fails_validation() {
        let _guard = env_lock().lock().expect("env lock");
        env::set_var("TIFFINSIGHT_INSIGHTS_TOP_N", "0");

        let error = AppConfig::load(LoadOptions::default()).expect_err("top_n 0 should fail");
        assert!(matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("insights.top_n")
        ));

        clear_vars(&["TIFFINSIGHT_INSIGHTS_TOP_N"]);
    }

    #[test]
    fn garbled_env_override_is_reported_with_its_key() {
        let _guard = env_lock().lock().expect("env lock");
        env::set_var("TIFFINSIGHT_INSIGHTS_TOP_N", "many");

        let error = AppConfig::load(LoadOptions::default()).expect_err("non-numeric should fail");
        assert!(matches!(
            error,
            ConfigError::InvalidEnvOverride { ref key, .. }
                if key == "TIFFINSIGHT_INSIGHTS_TOP_N"
        ));

        clear_vars(&["TIFFINSIGHT_INSIGHTS_TOP_N"]);
    }
}
