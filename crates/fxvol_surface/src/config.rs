//! Surface configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and
//! command-line overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fxvol_core::types::DayCountConvention;
use fxvol_models::heston::HestonPricingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::smile::SmileMethod;

/// Prefix of every environment variable read by [`SurfaceConfig::from_env`].
pub const ENV_PREFIX: &str = "FXVOL_";

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Unknown log level name.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Non-positive calibration threshold.
    #[error("Invalid SSE threshold: {0}. Must be positive")]
    InvalidThreshold(f64),

    /// FFT size that is not a power of two.
    #[error("Invalid FFT size: {0}. Must be a power of two")]
    InvalidFftPoints(usize),

    /// A setting that does not parse.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// Raw value
        value: String,
    },

    /// Unreadable or malformed config file.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels accepted by the command line and config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Fits and solves
    Debug,
    /// Construction summaries
    #[default]
    Info,
    /// Non-conventional inputs
    Warn,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Surface configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Day count for year fractions on the volatility axis
    pub day_count: DayCountConvention,
    /// How smiles are interpolated across strike
    pub smile_method: SmileMethod,
    /// Heston fits with an SSE at or above this are rejected
    pub sse_threshold: f64,
    /// Hold the boundary forward outside the quoted curve
    pub flat_extrapolation: bool,
    /// Heston pricer tuning
    pub heston: HestonPricingConfig,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            day_count: DayCountConvention::ActualActual,
            smile_method: SmileMethod::CubicSpline,
            sse_threshold: 0.001,
            flat_extrapolation: true,
            heston: HestonPricingConfig::default(),
            log_level: LogLevel::Info,
        }
    }
}

/// Setting names, as used in environment variables after [`ENV_PREFIX`].
const DAY_COUNT: &str = "DAY_COUNT";
const SMILE_METHOD: &str = "SMILE_METHOD";
const SSE_THRESHOLD: &str = "SSE_THRESHOLD";
const FLAT_EXTRAPOLATION: &str = "FLAT_EXTRAPOLATION";
const HESTON_INTEGRATION_LIMIT: &str = "HESTON_INTEGRATION_LIMIT";
const HESTON_TOLERANCE: &str = "HESTON_TOLERANCE";
const FFT_POINTS: &str = "FFT_POINTS";
const FFT_ETA: &str = "FFT_ETA";
const FFT_ALPHA: &str = "FFT_ALPHA";
const LOG_LEVEL: &str = "LOG_LEVEL";

fn parse_setting<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, key),
        value: value.to_string(),
    })
}

impl SurfaceConfig {
    /// Create a new SurfaceConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `FXVOL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides every setting that `lookup` returns a value for.
    ///
    /// `lookup` receives the setting name without [`ENV_PREFIX`].
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(DAY_COUNT) {
            self.day_count = DayCountConvention::from_str(&v).map_err(|_| {
                ConfigError::InvalidValue {
                    key: format!("{}{}", ENV_PREFIX, DAY_COUNT),
                    value: v.clone(),
                }
            })?;
        }
        if let Some(v) = lookup(SMILE_METHOD) {
            self.smile_method = parse_setting(SMILE_METHOD, &v)?;
        }
        if let Some(v) = lookup(SSE_THRESHOLD) {
            self.sse_threshold = parse_setting(SSE_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(FLAT_EXTRAPOLATION) {
            self.flat_extrapolation = v.trim().eq_ignore_ascii_case("true") || v.trim() == "1";
        }
        if let Some(v) = lookup(HESTON_INTEGRATION_LIMIT) {
            self.heston.integration_limit = parse_setting(HESTON_INTEGRATION_LIMIT, &v)?;
        }
        if let Some(v) = lookup(HESTON_TOLERANCE) {
            self.heston.tolerance = parse_setting(HESTON_TOLERANCE, &v)?;
        }
        if let Some(v) = lookup(FFT_POINTS) {
            self.heston.fft_points = parse_setting(FFT_POINTS, &v)?;
        }
        if let Some(v) = lookup(FFT_ETA) {
            self.heston.fft_eta = parse_setting(FFT_ETA, &v)?;
        }
        if let Some(v) = lookup(FFT_ALPHA) {
            self.heston.alpha = parse_setting(FFT_ALPHA, &v)?;
        }
        if let Some(v) = lookup(LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&v)?;
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SurfaceConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sse_threshold > 0.0 && self.sse_threshold.is_finite()) {
            return Err(ConfigError::InvalidThreshold(self.sse_threshold));
        }
        if self.heston.fft_points < 2 || !self.heston.fft_points.is_power_of_two() {
            return Err(ConfigError::InvalidFftPoints(self.heston.fft_points));
        }
        self.heston
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "heston".to_string(),
                value: e.to_string(),
            })
    }

    /// Merge with command-line overrides (they take precedence)
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(method) = cli.smile_method {
            self.smile_method = method;
        }
        if let Some(day_count) = cli.day_count {
            self.day_count = day_count;
        }
        if let Some(threshold) = cli.sse_threshold {
            self.sse_threshold = threshold;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        Ok(())
    }
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Smile method override
    pub smile_method: Option<SmileMethod>,
    /// Day count override
    pub day_count: Option<DayCountConvention>,
    /// SSE threshold override
    pub sse_threshold: Option<f64>,
    /// Log level override
    pub log_level: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliOverrides) -> Result<SurfaceConfig, ConfigError> {
    build_config_with(cli, |key| {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    })
}

/// [`build_config`] with an explicit environment lookup.
pub fn build_config_with<F>(cli: &CliOverrides, env: F) -> Result<SurfaceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => SurfaceConfig::from_file(path)?,
        None => SurfaceConfig::default(),
    };

    config.apply_env(env)?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ==========================================================
    // Defaults and parsing
    // ==========================================================

    #[test]
    fn test_default_config() {
        let config = SurfaceConfig::default();
        assert_eq!(config.day_count, DayCountConvention::ActualActual);
        assert_eq!(config.smile_method, SmileMethod::CubicSpline);
        assert_eq!(config.sse_threshold, 0.001);
        assert!(config.flat_extrapolation);
        assert_eq!(config.heston.fft_points, 4096);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SurfaceConfig::from_toml_str(
            r#"
            smile_method = "heston_analytical_1993"
            log_level = "debug"

            [heston]
            fft_points = 2048
            "#,
        )
        .unwrap();
        assert_eq!(config.smile_method, SmileMethod::HestonAnalytical1993);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.heston.fft_points, 2048);
        assert_eq!(config.heston.fft_eta, 0.25);
        assert_eq!(config.sse_threshold, 0.001);
    }

    // ==========================================================
    // Validation
    // ==========================================================

    #[test]
    fn test_rejects_bad_threshold_and_fft_size() {
        let mut config = SurfaceConfig::default();
        config.sse_threshold = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(0.0)));

        let mut config = SurfaceConfig::default();
        config.heston.fft_points = 3000;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFftPoints(3000)));
    }

    #[test]
    fn test_bad_toml_is_file_error() {
        assert!(matches!(
            SurfaceConfig::from_toml_str("sse_threshold = \"high\""),
            Err(ConfigError::FileError(_))
        ));
    }

    // ==========================================================
    // Layering
    // ==========================================================

    #[test]
    fn test_env_overrides_defaults() {
        let config = build_config_with(
            &CliOverrides::default(),
            env(&[("SMILE_METHOD", "univariate_spline"), ("FFT_POINTS", "1024")]),
        )
        .unwrap();
        assert_eq!(config.smile_method, SmileMethod::UnivariateSpline);
        assert_eq!(config.heston.fft_points, 1024);
    }

    #[test]
    fn test_cli_overrides_env() {
        let cli = CliOverrides {
            smile_method: Some(SmileMethod::HestonCarrMadanFft),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };
        let config = build_config_with(
            &cli,
            env(&[("SMILE_METHOD", "univariate_spline"), ("LOG_LEVEL", "trace")]),
        )
        .unwrap();
        assert_eq!(config.smile_method, SmileMethod::HestonCarrMadanFft);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_value_names_the_variable() {
        let err = build_config_with(&CliOverrides::default(), env(&[("SSE_THRESHOLD", "abc")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "FXVOL_SSE_THRESHOLD".to_string(),
                value: "abc".to_string()
            }
        );
    }
}
