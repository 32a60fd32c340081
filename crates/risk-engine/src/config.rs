//! Pipeline configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. CLI flags are applied by the binary on top.
//!
//! ```toml
//! engine_path = "/usr/bin/tesseract"
//! query_year = 2024
//! reference_table = "data/법정동코드.csv"
//!
//! [registry]
//! retries = 1
//!
//! [scoring]
//! model_path = "config/risk_model.toml"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::{DEFAULT_ENDPOINT as REGISTRY_ENDPOINT, DEFAULT_PAGE_SIZE};
use crate::summary::{DEFAULT_ENDPOINT as SUMMARY_ENDPOINT, DEFAULT_MODEL};

/// Linear model artifact shipped in the repository, relative to the workspace root
pub const DEFAULT_MODEL_PATH: &str = "config/risk_model.toml";

pub const ENV_CREDENTIAL: &str = "PUBLIC_DATA_API_KEY";
pub const ENV_SUMMARY_KEY: &str = "GEMINI_API_KEY";
pub const ENV_ENGINE_PATH: &str = "TESSERACT_PATH";
pub const ENV_QUERY_YEAR: &str = "QUERY_YEAR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tesseract executable
    pub engine_path: PathBuf,
    /// pdftoppm executable
    pub renderer_path: PathBuf,
    /// Public data portal service key
    pub credential: String,
    /// Calendar year searched for comparable sales
    pub query_year: i32,
    /// Rendering resolution for recognition
    pub dpi: u32,
    /// 법정동코드 listing (시도명, 시군구명, 읍면동명, 법정동코드)
    pub reference_table: PathBuf,
    pub reference_delimiter: char,
    pub registry: RegistryConfig,
    pub scoring: ScoringConfig,
    pub summary: SummaryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("tesseract"),
            renderer_path: PathBuf::from("pdftoppm"),
            credential: String::new(),
            query_year: 2024,
            dpi: 400,
            reference_table: PathBuf::from("법정동코드.csv"),
            reference_delimiter: ',',
            registry: RegistryConfig::default(),
            scoring: ScoringConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub endpoint: String,
    pub page_size: u32,
    /// Extra attempts for a failed monthly query
    pub retries: u32,
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: REGISTRY_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            retries: 0,
            timeout_secs: 10,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Either a local linear artifact or a remote model server; `endpoint` wins when both are set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub model_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_path: Some(PathBuf::from(DEFAULT_MODEL_PATH)),
            endpoint: None,
            timeout_secs: 10,
        }
    }
}

impl ScoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: SUMMARY_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SummaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PipelineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay process environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary source; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_CREDENTIAL) {
            self.credential = key;
        }
        if let Some(key) = get(ENV_SUMMARY_KEY) {
            self.summary.api_key = Some(key);
        }
        if let Some(path) = get(ENV_ENGINE_PATH) {
            self.engine_path = PathBuf::from(path);
        }
        if let Some(year) = get(ENV_QUERY_YEAR) {
            self.query_year = year
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_QUERY_YEAR,
                    value: year.clone(),
                })?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1000..=9999).contains(&self.query_year) {
            return Err(ConfigError::InvalidValue {
                key: "query_year",
                value: self.query_year.to_string(),
            });
        }
        if self.dpi == 0 {
            return Err(ConfigError::InvalidValue {
                key: "dpi",
                value: "0".to_string(),
            });
        }
        if self.registry.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "registry.page_size",
                value: "0".to_string(),
            });
        }
        if !self.reference_delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue {
                key: "reference_delimiter",
                value: self.reference_delimiter.to_string(),
            });
        }
        Ok(())
    }

    /// Delimiter byte for the reference table reader
    pub fn reference_delimiter_byte(&self) -> u8 {
        self.reference_delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.query_year, 2024);
        assert_eq!(config.dpi, 400);
        assert_eq!(config.engine_path, PathBuf::from("tesseract"));
        assert_eq!(config.registry.page_size, 100);
        assert_eq!(config.registry.retries, 0);
        assert_eq!(config.summary.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_default_model_path_is_the_bundled_artifact() {
        let config = PipelineConfig::default();
        let path = config.scoring.model_path.unwrap();
        assert_eq!(path, PathBuf::from("config/risk_model.toml"));

        let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        assert!(workspace_root.join(&path).is_file());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_str(
            r#"
            query_year = 2023
            reference_table = "data/lawd.tsv"
            reference_delimiter = "\t"

            [registry]
            retries = 2

            [scoring]
            endpoint = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.query_year, 2023);
        assert_eq!(config.reference_delimiter_byte(), b'\t');
        assert_eq!(config.registry.retries, 2);
        assert_eq!(config.registry.page_size, 100);
        assert_eq!(config.scoring.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.dpi, 400);
    }

    #[test]
    fn test_example_config_parses() {
        let config = PipelineConfig::from_str(include_str!("../../../config/jeonse.example.toml")).unwrap();
        assert_eq!(config.registry.retries, 1);
        assert_eq!(config.summary.api_key, None);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            PipelineConfig::from_str("dpi = \"high\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_str("dpi = 0"),
            Err(ConfigError::InvalidValue { key: "dpi", .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PUBLIC_DATA_API_KEY", "service-key"),
            ("GEMINI_API_KEY", "gemini-key"),
            ("TESSERACT_PATH", "/opt/tesseract"),
            ("QUERY_YEAR", "2025"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.credential, "service-key");
        assert_eq!(config.summary.api_key.as_deref(), Some("gemini-key"));
        assert_eq!(config.engine_path, PathBuf::from("/opt/tesseract"));
        assert_eq!(config.query_year, 2025);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = PipelineConfig::default();
        config
            .apply_env_with(|key| (key == ENV_CREDENTIAL).then(|| "  ".to_string()))
            .unwrap();
        assert_eq!(config.credential, "");
    }

    #[test]
    fn test_bad_query_year_env() {
        let mut config = PipelineConfig::default();
        let result = config.apply_env_with(|key| (key == ENV_QUERY_YEAR).then(|| "올해".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "QUERY_YEAR", .. })
        ));
    }
}
