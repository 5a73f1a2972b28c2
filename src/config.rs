//! Configuration module for the Cairo static analyzer.
//!
//! Layered configuration, same shape as the teacher crate this was ported
//! from: defaults, then an optional TOML file, then environment variables.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CAIROLINT_` and use double
//! underscores to separate nested levels:
//! - `CAIROLINT_ANALYSIS__MAX_PATHS=200` sets `analysis.max_paths`
//! - `CAIROLINT_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub walker: WalkerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Cap on enumerated entry-to-exit paths per function (spec.md §4.6).
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,

    /// Iteration cap for the reaching-definitions fixed point (spec.md §4.7).
    #[serde(default = "default_reaching_def_iterations")]
    pub reaching_def_iterations: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WalkerConfig {
    /// Extra glob excludes layered on top of the mandatory test-file
    /// exclusion from spec.md §6 (which is never configurable).
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Degree of parallelism for Pass 1 of the linker (spec.md §5).
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_max_paths() -> usize {
    100
}
fn default_reaching_def_iterations() -> usize {
    100
}
fn default_ignore_patterns() -> Vec<String> {
    vec!["target/**".to_string(), ".git/**".to_string()]
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            walker: WalkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_paths: default_max_paths(),
            reaching_def_iterations: default_reaching_def_iterations(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            parallel_threads: default_parallel_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources: defaults, `.cairo-lint/settings.toml`
    /// if present, then `CAIROLINT_`-prefixed environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".cairo-lint/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed("CAIROLINT_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    /// Load configuration from a specific file, still layering defaults and env.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("CAIROLINT_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".cairo-lint");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.max_paths, 100);
        assert_eq!(settings.analysis.reaching_def_iterations, 100);
        assert!(settings.walker.parallel_threads > 0);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
[analysis]
max_paths = 50
reaching_def_iterations = 10

[logging]
default = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.analysis.max_paths, 50);
        assert_eq!(settings.analysis.reaching_def_iterations, 10);
        assert_eq!(settings.logging.default, "debug");
        assert!(settings.walker.parallel_threads > 0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[analysis]\nmax_paths = 5\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.analysis.max_paths, 5);
        assert_eq!(settings.analysis.reaching_def_iterations, 100);
    }
}
