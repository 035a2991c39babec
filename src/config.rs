use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::features::extractors::DEFAULT_COAUTHOR_RADIUS;
use crate::sampling::PAIRS_PER_ROUND;

/// Prefix of every environment variable the config reads.
pub const KEY_PREFIX: &str = "DISAMBIGUATION_";

/// Configuration for one disambiguation run.
///
/// Built once (from the environment via [`Config::load`], or directly in
/// tests) and passed by reference to the pipelines. Nothing reads the
/// environment after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the default data and model paths live under
    pub base_path: PathBuf,
    /// JSON-lines export of literature records served as the document index
    pub records_path: PathBuf,
    /// Ethnicity training data (CSV)
    pub ethnicity_data_path: PathBuf,
    pub ethnicity_model_path: PathBuf,
    pub distance_model_path: PathBuf,
    pub clustering_model_path: PathBuf,
    /// Number of training pairs to sample; must be a multiple of 12
    pub sampled_pairs_size: usize,
    /// Fixed seed for pair sampling (random when unset)
    pub sampling_seed: Option<u64>,
    /// Rejection attempts per sampled pair before a bucket gives up
    pub sampling_max_attempts: usize,
    /// Parallelism hint forwarded to the clusterer
    pub clustering_n_jobs: usize,
    pub coauthor_radius: usize,
    /// How long a reclustering run waits for the next block before stopping
    pub queue_timeout: Duration,
    /// Show a progress spinner during long runs
    pub display_progress: bool,
    /// Default tracing level when RUST_LOG is not set
    pub log_level: String,
    /// Cap on records fetched per index query
    pub max_query_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_path(PathBuf::from("./disambiguation"))
    }
}

impl Config {
    /// Defaults with every data and model path placed under `base_path`.
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            records_path: base_path.join("records.jsonl"),
            ethnicity_data_path: base_path.join("ethnicity.csv"),
            ethnicity_model_path: base_path.join("ethnicity.model"),
            distance_model_path: base_path.join("distance.model"),
            clustering_model_path: base_path.join("clustering.json"),
            base_path,
            sampled_pairs_size: PAIRS_PER_ROUND * 20,
            sampling_seed: None,
            sampling_max_attempts: 1000,
            clustering_n_jobs: 8,
            coauthor_radius: DEFAULT_COAUTHOR_RADIUS,
            queue_timeout: Duration::from_secs(5),
            display_progress: false,
            log_level: "warn".to_string(),
            max_query_size: None,
        }
    }

    /// Load configuration from `DISAMBIGUATION_*` environment variables.
    ///
    /// Unset variables keep their defaults; paths default to files under
    /// `DISAMBIGUATION_BASE_PATH`. A set but malformed numeric value is an error.
    pub fn load() -> Result<Self> {
        let base_path = var("BASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./disambiguation"));
        let mut config = Self::with_base_path(base_path);

        if let Some(path) = var("RECORDS_PATH") {
            config.records_path = path.into();
        }
        if let Some(path) = var("ETHNICITY_DATA_PATH") {
            config.ethnicity_data_path = path.into();
        }
        if let Some(path) = var("ETHNICITY_MODEL_PATH") {
            config.ethnicity_model_path = path.into();
        }
        if let Some(path) = var("DISTANCE_MODEL_PATH") {
            config.distance_model_path = path.into();
        }
        if let Some(path) = var("CLUSTERING_MODEL_PATH") {
            config.clustering_model_path = path.into();
        }
        if let Some(size) = parsed_var("SAMPLED_PAIRS_SIZE")? {
            config.sampled_pairs_size = size;
        }
        config.sampling_seed = parsed_var("SAMPLING_SEED")?;
        if let Some(attempts) = parsed_var("SAMPLING_MAX_ATTEMPTS")? {
            config.sampling_max_attempts = attempts;
        }
        if let Some(n_jobs) = parsed_var("CLUSTERING_N_JOBS")? {
            config.clustering_n_jobs = n_jobs;
        }
        if let Some(radius) = parsed_var("COAUTHOR_RADIUS")? {
            config.coauthor_radius = radius;
        }
        if let Some(secs) = parsed_var::<u64>("QUEUE_TIMEOUT_SECS")? {
            config.queue_timeout = Duration::from_secs(secs);
        }
        if let Some(display) = var("DISPLAY_PROGRESS") {
            config.display_progress = matches!(display.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(level) = var("LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }
        config.max_query_size = parsed_var("ES_MAX_QUERY_SIZE")?;

        Ok(config)
    }

    /// Check that the sampled pairs size fits the 12-pair sampling rounds.
    /// Call this before training the distance model.
    pub fn require_pairs_size(&self) -> Result<()> {
        if self.sampled_pairs_size % PAIRS_PER_ROUND != 0 {
            anyhow::bail!(
                "{KEY_PREFIX}SAMPLED_PAIRS_SIZE is {}, but it must be a multiple of {PAIRS_PER_ROUND}.",
                self.sampled_pairs_size
            );
        }
        Ok(())
    }
}

fn var(key: &str) -> Option<String> {
    env::var(format!("{KEY_PREFIX}{key}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {KEY_PREFIX}{key}: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_follow_base_path() {
        let config = Config::with_base_path(PathBuf::from("/data"));
        assert_eq!(config.records_path, PathBuf::from("/data/records.jsonl"));
        assert_eq!(config.distance_model_path, PathBuf::from("/data/distance.model"));
    }

    #[test]
    fn test_default_pairs_size_is_valid() {
        let config = Config::default();
        assert_eq!(config.sampled_pairs_size, 240);
        assert!(config.require_pairs_size().is_ok());
    }

    #[test]
    fn test_require_pairs_size_rejects_non_multiple() {
        let config = Config {
            sampled_pairs_size: 100,
            ..Config::default()
        };
        assert!(config.require_pairs_size().is_err());
    }
}
