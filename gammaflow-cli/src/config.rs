//! Configuration loading from gammaflow.toml
//!
//! Gammaflow configuration can be specified in a `gammaflow.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory. Command-line flags override it.

use gammaflow_core::{DEFAULT_ROUNDS, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, SweepConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gammaflow configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GammaflowConfig {
    /// Sweep configuration
    #[serde(default)]
    pub sweep: SweepSection,
    /// Executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Sweep parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Samples drawn per round
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Initial gamma shape
    #[serde(default = "default_parameter")]
    pub shape: f64,
    /// Initial gamma scale
    #[serde(default = "default_parameter")]
    pub scale: f64,
    /// Number of rounds
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Seed of the random source
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            shape: default_parameter(),
            scale: default_parameter(),
            rounds: default_rounds(),
            seed: default_seed(),
        }
    }
}

impl From<&SweepSection> for SweepConfig {
    fn from(section: &SweepSection) -> Self {
        SweepConfig {
            sample_size: section.sample_size,
            shape: section.shape,
            scale: section.scale,
            rounds: section.rounds,
            seed: section.seed,
        }
    }
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}
fn default_parameter() -> f64 {
    1.0
}
fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Execution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One node at a time on the main thread (default)
    #[default]
    Sequential,
    /// Ready nodes on a fixed-size worker pool
    Parallel,
}

impl Strategy {
    /// Whether this strategy uses a worker pool
    pub fn is_parallel(self) -> bool {
        matches!(self, Strategy::Parallel)
    }
}

/// Executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// "sequential" or "parallel"
    #[serde(default)]
    pub strategy: Strategy,
    /// Worker threads for the parallel strategy
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    gammaflow_graph::DEFAULT_WORKERS
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Result format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Significant digits for human output
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Write the graph structure as DOT before running
    #[serde(default = "default_write_dot")]
    pub write_dot: bool,
    /// Path of the DOT file
    #[serde(default = "default_dot_path")]
    pub dot_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            precision: default_precision(),
            write_dot: default_write_dot(),
            dot_path: default_dot_path(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_precision() -> usize {
    gammaflow_report::DEFAULT_PRECISION
}
fn default_write_dot() -> bool {
    true
}
fn default_dot_path() -> String {
    "statistical_key_facts.dot".to_string()
}

/// Nearest `gammaflow.toml` at or above `start`
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join("gammaflow.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            return None;
        }
    }
}

impl GammaflowConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory
    ///
    /// `Ok(None)` when no `gammaflow.toml` exists; an error when one is found
    /// but cannot be read or parsed.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let dir = std::env::current_dir()?;
        Self::discover_from(&dir)
    }

    /// Discover and load configuration by walking up from `start`
    pub fn discover_from(start: &Path) -> anyhow::Result<Option<Self>> {
        let Some(config_path) = find_config(start) else {
            return Ok(None);
        };
        let config = Self::load(&config_path).map_err(|e| {
            anyhow::anyhow!("Failed to load {}: {}", config_path.display(), e)
        })?;
        Ok(Some(config))
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Gammaflow Configuration

[sweep]
# Samples drawn from the gamma distribution per round
sample_size = 1000
# Initial shape and scale; round N adds N to both after it completes
shape = 1.0
scale = 1.0
# Number of rounds
rounds = 3
# Seed of the random source (never reseeded during a run)
seed = 1

[executor]
# "sequential" or "parallel"
strategy = "sequential"
# Worker threads for the parallel strategy
workers = 4

[output]
# Result format: human, json, csv
format = "human"
# Significant digits for human output
precision = 3
# Write the graph structure for Graphviz before running
write_dot = true
dot_path = "statistical_key_facts.dot"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GammaflowConfig::default();
        assert_eq!(config.sweep.sample_size, 1000);
        assert_eq!(config.sweep.rounds, 3);
        assert_eq!(config.sweep.seed, 1);
        assert_eq!(config.executor.strategy, Strategy::Sequential);
        assert_eq!(config.executor.workers, 4);
        assert_eq!(config.output.precision, 3);
        assert!(config.output.write_dot);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [sweep]
            sample_size = 250
            seed = 99

            [executor]
            strategy = "parallel"
        "#;

        let config: GammaflowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.sample_size, 250);
        assert_eq!(config.sweep.seed, 99);
        assert!(config.executor.strategy.is_parallel());
        // Defaults should still apply
        assert_eq!(config.sweep.rounds, 3);
        assert_eq!(config.executor.workers, 4);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = GammaflowConfig::default_toml();
        let config: GammaflowConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.sweep.sample_size, 1000);
        assert_eq!(config.output.dot_path, "statistical_key_facts.dot");
    }

    #[test]
    fn test_sweep_section_converts() {
        let section = SweepSection {
            shape: 2.5,
            ..SweepSection::default()
        };
        let sweep = SweepConfig::from(&section);
        assert!((sweep.shape - 2.5).abs() < f64::EPSILON);
        assert_eq!(sweep.rounds, section.rounds);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gammaflow-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = scratch_dir("discover");
        std::fs::write(dir.join("gammaflow.toml"), "[sweep]\nrounds = 5\n").unwrap();

        let config = GammaflowConfig::discover_from(&dir.join("nested")).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(config.map(|c| c.sweep.rounds), Some(5));
    }

    #[test]
    fn test_discover_reports_malformed_file() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("gammaflow.toml"), "[sweep]\nrounds = \"three\"\n").unwrap();

        let result = GammaflowConfig::discover_from(&dir.join("nested"));
        let _ = std::fs::remove_dir_all(&dir);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("gammaflow.toml"));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let toml_str = r#"
            [executor]
            strategy = "distributed"
        "#;
        assert!(toml::from_str::<GammaflowConfig>(toml_str).is_err());
    }
}
