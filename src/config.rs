use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BenchError, Result};
use crate::vision::{ColorSpec, SceneColor, default_color_specs};

/// Main configuration structure loaded from vqa_bench.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub agent: AgentConfig,
    pub model: ModelEndpointConfig,
    pub judge: ModelEndpointConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

/// Tunable constants of the color/shape scene detector
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Contours with polygon area strictly below this are treated as noise
    pub min_contour_area: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub approx_epsilon_ratio: f64,
    /// Vertex count that classifies an approximated contour as a square
    pub square_vertices: usize,
    /// Colors in scan order; each color may own several HSV sub-ranges
    pub colors: Vec<ColorSpec>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_contour_area: 100.0,
            approx_epsilon_ratio: 0.04,
            square_vertices: 4,
            colors: default_color_specs(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_contour_area < 0.0 {
            return Err(config_error("detector.min_contour_area must be >= 0"));
        }
        if self.approx_epsilon_ratio <= 0.0 {
            return Err(config_error("detector.approx_epsilon_ratio must be > 0"));
        }
        if self.square_vertices < 3 {
            return Err(config_error("detector.square_vertices must be >= 3"));
        }
        let mut seen: Vec<SceneColor> = Vec::with_capacity(self.colors.len());
        for spec in &self.colors {
            if seen.contains(&spec.color) {
                return Err(config_error(format!(
                    "detector.colors lists {} more than once; merge its ranges into one entry",
                    spec.color
                )));
            }
            seen.push(spec.color);
            if spec.ranges.is_empty() {
                return Err(config_error(format!("color {} has no HSV ranges", spec.color)));
            }
            for range in &spec.ranges {
                if !range.is_well_formed() {
                    return Err(config_error(format!(
                        "color {} has an inverted or out-of-scale HSV range {:?}",
                        spec.color, range
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Completion budgets for the agent pipelines and the judge
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    pub plan_max_tokens: u32,
    pub extract_max_tokens: u32,
    /// Budget for final answers; `None` leaves it to the backend default
    pub answer_max_tokens: Option<u32>,
    pub judge_max_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            plan_max_tokens: 100,
            extract_max_tokens: 150,
            answer_max_tokens: None,
            judge_max_tokens: 5,
        }
    }
}

/// OpenAI-compatible inference endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelEndpointConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the env var holding the bearer token, if the server wants one
    pub api_key_env: Option<String>,
    pub timeout_ms: u64,
    pub temperature: f32,
}

impl Default for ModelEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            model: "Qwen/Qwen2-VL-2B-Instruct".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            timeout_ms: 120_000,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub csv_path: PathBuf,
    pub images_dir: PathBuf,
    pub image_extension: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/dataset.csv"),
            images_dir: PathBuf::from("data/images"),
            image_extension: "png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Directory for the plain-text log file; `None` disables file output
    pub log_dir: Option<PathBuf>,
    pub log_file: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "vqa_bench=info".to_string(),
            log_dir: Some(PathBuf::from("logs")),
            log_file: "evaluation.log".to_string(),
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses VQA_BENCH_CONFIG environment variable or defaults to "vqa_bench.toml"
    pub fn load() -> Result<Self> {
        if let Ok(env_path) = std::env::var("VQA_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path =
            std::env::var("VQA_BENCH_CONFIG").unwrap_or_else(|_| "vqa_bench.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides for endpoints, dataset paths and logging
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("VQA_MODEL_ENDPOINT") {
            self.model.endpoint = v;
        }
        if let Ok(v) = std::env::var("VQA_MODEL_NAME") {
            self.model.model = v;
        }
        if let Ok(v) = std::env::var("VQA_JUDGE_ENDPOINT") {
            self.judge.endpoint = v;
        }
        if let Ok(v) = std::env::var("VQA_JUDGE_NAME") {
            self.judge.model = v;
        }
        if let Ok(v) = std::env::var("VQA_DATASET_CSV") {
            self.dataset.csv_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("VQA_IMAGES_DIR") {
            self.dataset.images_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("VQA_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("VQA_LOG_DIR") {
            self.logging.log_dir = if v.is_empty() { None } else { Some(PathBuf::from(v)) };
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;

        if self.agent.plan_max_tokens == 0
            || self.agent.extract_max_tokens == 0
            || self.agent.judge_max_tokens == 0
            || self.agent.answer_max_tokens == Some(0)
        {
            return Err(config_error("agent token budgets must be > 0"));
        }

        for (label, endpoint) in [("model", &self.model), ("judge", &self.judge)] {
            if endpoint.endpoint.trim().is_empty() {
                return Err(config_error(format!("{label}.endpoint must not be empty")));
            }
            if endpoint.model.trim().is_empty() {
                return Err(config_error(format!("{label}.model must not be empty")));
            }
            if !endpoint.endpoint.starts_with("http://") && !endpoint.endpoint.starts_with("https://") {
                tracing::warn!(
                    "{} endpoint '{}' doesn't start with http:// or https://",
                    label,
                    endpoint.endpoint
                );
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> BenchError {
    BenchError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::HsvRange;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.min_contour_area, 100.0);
        assert_eq!(config.agent.plan_max_tokens, 100);
        assert_eq!(config.agent.extract_max_tokens, 150);
        assert_eq!(config.agent.judge_max_tokens, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [detector]
            min_contour_area = 250.0

            [judge]
            model = "judge-vlm"
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.min_contour_area, 250.0);
        assert_eq!(config.detector.approx_epsilon_ratio, 0.04);
        assert_eq!(config.detector.colors.len(), 5);
        assert_eq!(config.judge.model, "judge-vlm");
        assert_eq!(config.model.endpoint, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_color_ranges_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [[detector.colors]]
            color = "blue"
            ranges = [{ lower = [100, 150, 0], upper = [140, 255, 255] }]
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.colors.len(), 1);
        assert_eq!(config.detector.colors[0].color, SceneColor::Blue);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_toml_str(include_str!("../vqa_bench.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.colors, DetectorConfig::default().colors);
        assert_eq!(config.judge.timeout_ms, 60000);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = Config::default();
        config.detector.colors[1].ranges = vec![HsvRange::new([85, 100, 100], [35, 255, 255])];
        assert!(matches!(config.validate(), Err(BenchError::Config { .. })));
    }

    #[test]
    fn test_duplicate_color_rejected() {
        let mut config = Config::default();
        let red = config.detector.colors[0].clone();
        config.detector.colors.push(red);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = Config::default();
        config.agent.judge_max_tokens = 0;
        assert!(config.validate().is_err());
    }
}
